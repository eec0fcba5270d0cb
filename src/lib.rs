//! Contract caller - query and transaction pipeline for ink! contracts
//!
//! Queries read contract state without signing. Transactions pass a balance
//! check and a dry run before they are signed and broadcast, then resolve at
//! the chain's terminal milestone: inclusion in a block on development
//! chains, finalization everywhere else. Every failure is reported as a
//! [`TxError`] carrying one [`ErrorKind`].

pub mod caller;
pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod query;
pub mod tx;
pub mod types;

pub use caller::ContractCaller;
pub use chain::{
    BalanceQuery, ChainTransport, ContractAbi, EventRecord, FinalityMode, StatusSubscription,
    SubmittableResult, TxStatus,
};
pub use config::Settings;
pub use error::{CallError, ErrorKind, TransportError, TxError, TxResult};
pub use tx::{StatusObserver, TransactionResult};
pub use types::{AccountId, CallOptions, ContractRef, SimulationOutcome, Weight};
