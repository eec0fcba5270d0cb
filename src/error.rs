//! Error types for the contract call pipeline

use crate::chain::EventRecord;
use crate::types::SimulationOutcome;

use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a failed transaction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The account holder rejected the signing request
    UserCancelled,
    /// Zero balance, balance not above the attached value, or chain code 1010
    TokenBelowMinimum,
    /// Included on chain but the runtime emitted `System.ExtrinsicFailed`
    ExtrinsicFailed,
    /// The dry run reported a contract-level failure
    ContractError,
    /// Structured RPC failure carrying a node error code
    RpcError(i64),
    /// No terminal status arrived within the configured window
    Timeout,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Metric label for this kind
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::UserCancelled => "user_cancelled",
            ErrorKind::TokenBelowMinimum => "token_below_minimum",
            ErrorKind::ExtrinsicFailed => "extrinsic_failed",
            ErrorKind::ContractError => "contract_error",
            ErrorKind::RpcError(_) => "rpc_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UserCancelled => f.write_str("UserCancelled"),
            ErrorKind::TokenBelowMinimum => f.write_str("TokenBelowMinimum"),
            ErrorKind::ExtrinsicFailed => f.write_str("ExtrinsicFailed"),
            ErrorKind::ContractError => f.write_str("ContractError"),
            ErrorKind::RpcError(code) => write!(f, "RpcError({})", code),
            ErrorKind::Timeout => f.write_str("Timeout"),
            ErrorKind::Unknown => f.write_str("Error"),
        }
    }
}

/// Rejection payload of a transaction attempt.
///
/// Carries the classification plus whatever diagnostic context was
/// available at the point of failure. Extrinsic identifiers are only set
/// once the transaction reached a block.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{kind}: {message}")]
pub struct TxError {
    pub kind: ErrorKind,
    /// Human-readable message, suitable for direct display
    pub message: String,
    pub dry_result: Option<Box<SimulationOutcome>>,
    pub error_event: Option<EventRecord>,
    pub extrinsic_hash: Option<H256>,
    pub extrinsic_index: Option<u32>,
    pub block_hash: Option<H256>,
}

impl TxError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            dry_result: None,
            error_event: None,
            extrinsic_hash: None,
            extrinsic_index: None,
            block_hash: None,
        }
    }

    /// Error whose message is the kind's own code
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.to_string())
    }

    pub fn with_dry_result(mut self, dry_result: SimulationOutcome) -> Self {
        self.dry_result = Some(Box::new(dry_result));
        self
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.error_event = Some(event);
        self
    }

    pub fn with_extrinsic(
        mut self,
        extrinsic_hash: H256,
        extrinsic_index: Option<u32>,
        block_hash: Option<H256>,
    ) -> Self {
        self.extrinsic_hash = Some(extrinsic_hash);
        self.extrinsic_index = extrinsic_index;
        self.block_hash = block_hash;
        self
    }

    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Nothing in this crate retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout | ErrorKind::RpcError(_))
    }

    /// Whether the account holder caused the failure and can act on it
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UserCancelled | ErrorKind::TokenBelowMinimum | ErrorKind::ContractError
        )
    }
}

/// Result type for transaction attempts
pub type TxResult<T> = Result<T, TxError>;

/// Broad origin of a transport failure, when the transport knows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    UserRejected,
    Rpc,
    Network,
    Other,
}

/// Structured description of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorProbe {
    pub code: Option<i64>,
    pub category: ErrorCategory,
}

/// Failure raised by a chain collaborator (RPC, signer, subscription)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// Present when the transport can describe the failure without text matching
    pub probe: Option<ErrorProbe>,
}

impl TransportError {
    /// Untyped error, classified from its message alone
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            probe: None,
        }
    }

    pub fn with_probe(mut self, probe: ErrorProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::new(message).with_probe(ErrorProbe {
            code: Some(code),
            category: ErrorCategory::Rpc,
        })
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(message).with_probe(ErrorProbe {
            code: None,
            category: ErrorCategory::UserRejected,
        })
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(message).with_probe(ErrorProbe {
            code: None,
            category: ErrorCategory::Network,
        })
    }
}

/// Failure raised by the ABI collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Message {0} not found in contract ABI")]
    MessageNotFound(String),

    #[error("Failed to encode arguments for {method}: {reason}")]
    Encode { method: String, reason: String },
}

/// Error of the read-only paths (query and simulate), surfaced unclassified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
