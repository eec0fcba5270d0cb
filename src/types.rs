//! Call data model shared by the query and transaction paths

use crate::chain::ContractAbi;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Native token amount in the chain's smallest unit
pub type Balance = u128;

/// Opaque call argument handed to the ABI encoder untouched
pub type CallArg = serde_json::Value;

/// SS58 account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Two-dimensional weight (computation time and proof size)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    pub ref_time: u64,
    pub proof_size: u64,
}

impl Weight {
    pub const fn new(ref_time: u64, proof_size: u64) -> Self {
        Self {
            ref_time,
            proof_size,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ref_time: {}, proof_size: {}}}", self.ref_time, self.proof_size)
    }
}

/// Caller-supplied call options.
///
/// Options are never mutated by the pipeline: each attempt derives its own
/// copy, so one value can be reused across attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Value transferred to the contract with the call
    pub value: Option<Balance>,
    /// Gas ceiling. Ignored for transactions, where the dry-run estimate wins.
    pub gas_limit: Option<Weight>,
    /// Maximum storage deposit the caller is willing to pay
    pub storage_deposit_limit: Option<Balance>,
}

impl CallOptions {
    pub fn with_value(mut self, value: Balance) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: Weight) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_storage_deposit_limit(mut self, limit: Balance) -> Self {
        self.storage_deposit_limit = Some(limit);
        self
    }

    /// Copy of these options with the gas limit cleared
    pub fn without_gas_limit(&self) -> Self {
        Self {
            gas_limit: None,
            ..*self
        }
    }
}

/// Deployed contract: its address plus the ABI used to encode and decode calls
#[derive(Clone)]
pub struct ContractRef {
    pub address: AccountId,
    pub abi: Arc<dyn ContractAbi>,
}

impl ContractRef {
    pub fn new(address: AccountId, abi: Arc<dyn ContractAbi>) -> Self {
        Self { address, abi }
    }
}

impl fmt::Debug for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRef")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// One contract method invocation, fixed for the lifetime of an attempt
#[derive(Debug, Clone)]
pub struct ContractCallRequest {
    contract: ContractRef,
    method: String,
    args: Vec<CallArg>,
    options: CallOptions,
}

impl ContractCallRequest {
    pub fn new(
        contract: ContractRef,
        method: impl Into<String>,
        options: CallOptions,
        args: Vec<CallArg>,
    ) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
            options,
        }
    }

    pub fn contract(&self) -> &ContractRef {
        &self.contract
    }

    pub fn contract_address(&self) -> &AccountId {
        &self.contract.address
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[CallArg] {
        &self.args
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    /// ABI-encoded call data for this request
    pub fn encode(&self) -> Result<Vec<u8>, crate::error::AbiError> {
        self.contract.abi.encode_call(&self.method, &self.args)
    }
}

/// Storage deposit reported by a contract call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageDeposit {
    Refund(Balance),
    Charge(Balance),
}

impl Default for StorageDeposit {
    fn default() -> Self {
        StorageDeposit::Charge(0)
    }
}

/// Data returned by a contract message that executed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecReturnValue {
    pub flags: u32,
    pub data: Vec<u8>,
}

impl ExecReturnValue {
    const REVERT_FLAG: u32 = 0x0000_0001;

    /// Whether the contract signalled a revert
    pub fn did_revert(&self) -> bool {
        self.flags & Self::REVERT_FLAG != 0
    }
}

/// Raw result of the chain's contract call entry point, before ABI decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCallOutcome {
    pub gas_consumed: Weight,
    pub gas_required: Weight,
    pub storage_deposit: StorageDeposit,
    pub debug_message: String,
    /// Return value, or the dispatch error rendered by the transport
    pub result: Result<ExecReturnValue, String>,
}

impl Default for RawCallOutcome {
    fn default() -> Self {
        Self {
            gas_consumed: Weight::default(),
            gas_required: Weight::default(),
            storage_deposit: StorageDeposit::default(),
            debug_message: String::new(),
            result: Ok(ExecReturnValue::default()),
        }
    }
}

/// Output of the ABI decoder for a call outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedOutput {
    pub is_error: bool,
    pub decoded_output: Option<String>,
}

/// Decoded result of a simulated (dry-run) or query call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub gas_required: Weight,
    pub gas_consumed: Weight,
    pub storage_deposit: StorageDeposit,
    pub debug_message: String,
    pub raw_result: Result<ExecReturnValue, String>,
    pub is_error: bool,
    pub decoded_output: Option<String>,
}

impl SimulationOutcome {
    pub fn new(raw: RawCallOutcome, decoded: DecodedOutput) -> Self {
        Self {
            gas_required: raw.gas_required,
            gas_consumed: raw.gas_consumed,
            storage_deposit: raw.storage_deposit,
            debug_message: raw.debug_message,
            raw_result: raw.result,
            is_error: decoded.is_error,
            decoded_output: decoded.decoded_output,
        }
    }
}
