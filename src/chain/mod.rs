//! Chain module - collaborators consumed by the call pipeline
//!
//! This module provides:
//! - The transport contract: contract call simulation, signing and broadcast,
//!   runtime chain name and read-call gas ceiling
//! - Balance lookups and ABI encoding/decoding contracts
//! - The extrinsic status model and the status subscription handle
//! - Chain-mode dependent finality milestones

pub mod finality;
pub mod status;
pub mod subscription;

pub use finality::FinalityMode;
pub use status::{EventRecord, Phase, SubmittableResult, TxStatus};
pub use subscription::{StatusStream, StatusSubscription};

use crate::error::{AbiError, TransportError};
use crate::types::{AccountId, Balance, CallArg, DecodedOutput, RawCallOutcome, Weight};

use async_trait::async_trait;

/// Arguments of the chain's contract call entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub origin: AccountId,
    pub dest: AccountId,
    pub value: Balance,
    /// `None` lets the node meter the call without a ceiling
    pub gas_limit: Option<Weight>,
    pub storage_deposit_limit: Option<Balance>,
    pub input: Vec<u8>,
}

/// Signed `contracts.call` extrinsic to broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicCall {
    pub dest: AccountId,
    pub value: Balance,
    pub gas_limit: Weight,
    pub storage_deposit_limit: Option<Balance>,
    pub input: Vec<u8>,
}

/// Live connection to a contracts-enabled chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Runtime chain name the node reports (e.g. "Development")
    fn runtime_chain(&self) -> String;

    /// Largest gas value usable for a read-only call on this chain
    fn max_gas_limit(&self) -> Weight;

    /// Execute a contract message against current state without committing it
    async fn contract_call(&self, call: ContractCall) -> Result<RawCallOutcome, TransportError>;

    /// Sign `call` as `signer`, broadcast it and watch its status
    async fn sign_and_submit(
        &self,
        signer: &AccountId,
        call: ExtrinsicCall,
    ) -> Result<StatusSubscription, TransportError>;
}

/// Account balance lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Spendable balance of `account`, or `None` if the account does not exist
    async fn reducible_balance(&self, account: &AccountId)
        -> Result<Option<Balance>, TransportError>;
}

/// Contract metadata: message resolution, argument encoding and output decoding
#[cfg_attr(test, mockall::automock)]
pub trait ContractAbi: Send + Sync {
    /// Resolve `method` by name and encode `args` into call data
    fn encode_call(&self, method: &str, args: &[CallArg]) -> Result<Vec<u8>, AbiError>;

    /// Decode the outcome of calling `method`
    fn decode_output(&self, outcome: &RawCallOutcome, method: &str) -> DecodedOutput;
}
