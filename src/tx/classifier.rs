//! Maps dry-run results, transport failures and block events onto [`ErrorKind`]
//!
//! Classification is pure. Structured probes supplied by the transport are
//! consulted first; message matching only applies to untyped errors.

use crate::chain::SubmittableResult;
use crate::config::ClassifierConfig;
use crate::error::{ErrorCategory, ErrorKind, ErrorProbe, TransportError, TxError};
use crate::types::SimulationOutcome;

use regex::Regex;
use tracing::debug;

pub struct ErrorClassifier {
    user_rejection: Regex,
    rpc_code: Regex,
    insufficient_balance_code: i64,
}

impl ErrorClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            user_rejection: Regex::new(&config.user_rejection_pattern)?,
            rpc_code: Regex::new(&config.rpc_code_pattern)?,
            insufficient_balance_code: config.insufficient_balance_code,
        })
    }

    /// `ContractError` if the dry run reported failure
    pub fn classify_simulation(&self, outcome: &SimulationOutcome) -> Option<TxError> {
        if !outcome.is_error {
            return None;
        }

        let message = outcome
            .decoded_output
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("Error");

        Some(TxError::new(ErrorKind::ContractError, message).with_dry_result(outcome.clone()))
    }

    /// Classify a failure raised while signing, broadcasting or watching
    pub fn classify_transport(&self, err: &TransportError) -> TxError {
        let kind = err
            .probe
            .and_then(|probe| self.classify_probe(probe))
            .unwrap_or_else(|| self.classify_message(&err.message));

        debug!("Classified transport error {:?} as {}", err.message, kind);

        match kind {
            ErrorKind::RpcError(_) | ErrorKind::Unknown if !err.message.is_empty() => {
                TxError::new(kind, err.message.clone())
            }
            _ => TxError::from_kind(kind),
        }
    }

    /// `ExtrinsicFailed` if the block carries a system failure event for the extrinsic
    pub fn classify_block(&self, result: &SubmittableResult) -> Option<TxError> {
        result
            .failure_event()
            .map(|event| TxError::from_kind(ErrorKind::ExtrinsicFailed).with_event(event.clone()))
    }

    fn classify_probe(&self, probe: ErrorProbe) -> Option<ErrorKind> {
        if probe.category == ErrorCategory::UserRejected {
            return Some(ErrorKind::UserCancelled);
        }

        match probe.code {
            Some(code) if code == self.insufficient_balance_code => {
                Some(ErrorKind::TokenBelowMinimum)
            }
            Some(code) => Some(ErrorKind::RpcError(code)),
            None => None,
        }
    }

    fn classify_message(&self, message: &str) -> ErrorKind {
        if self.user_rejection.is_match(message) {
            return ErrorKind::UserCancelled;
        }

        let code = self
            .rpc_code
            .captures(message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok());

        match code {
            Some(code) if code == self.insufficient_balance_code => ErrorKind::TokenBelowMinimum,
            _ => ErrorKind::Unknown,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default()).expect("default classifier patterns compile")
    }
}
