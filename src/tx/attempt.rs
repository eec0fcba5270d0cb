//! Lifecycle of a single transaction attempt
//!
//! ```text
//! Created -> BalanceChecked -> Simulated -> Broadcasting -> InBlock -> Succeeded | Failed
//!    \______________\_____________\-> Rejected        \______________-> Succeeded | Failed
//! ```
//!
//! `Rejected` covers every exit before broadcast. Once the attempt is in a
//! terminal state all further input is ignored, which is what guarantees a
//! single resolution per attempt.

use crate::chain::{EventRecord, FinalityMode, SubmittableResult, TxStatus};
use crate::error::{ErrorKind, TransportError, TxError, TxResult};
use crate::tx::classifier::ErrorClassifier;
use crate::types::{ContractCallRequest, SimulationOutcome};

use primitive_types::H256;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttemptState {
    Created,
    BalanceChecked,
    Simulated,
    Broadcasting,
    /// Included in a block that is not yet the terminal milestone
    InBlock,
    Succeeded,
    Failed,
    Rejected,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::Succeeded | AttemptState::Failed | AttemptState::Rejected
        )
    }

    pub fn can_transition_to(&self, next: AttemptState) -> bool {
        use AttemptState::*;

        matches!(
            (*self, next),
            (Created, BalanceChecked)
                | (BalanceChecked, Simulated)
                | (Created | BalanceChecked | Simulated, Rejected)
                | (Simulated, Broadcasting)
                | (Broadcasting, InBlock)
                | (InBlock, Broadcasting)
                | (Broadcasting | InBlock, Succeeded | Failed)
        )
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Successful resolution of a transaction attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResult {
    pub dry_result: SimulationOutcome,
    /// The terminal status update, with its events
    pub result: SubmittableResult,
    pub success_event: Option<EventRecord>,
    pub extrinsic_hash: H256,
    pub extrinsic_index: Option<u32>,
    pub block_hash: H256,
}

/// One pass of a request through the pipeline
#[derive(Debug)]
pub struct TransactionAttempt {
    id: Uuid,
    request: ContractCallRequest,
    finality: FinalityMode,
    state: AttemptState,
    dry_result: Option<SimulationOutcome>,
    extrinsic_hash: Option<H256>,
    extrinsic_index: Option<u32>,
    block_hash: Option<H256>,
    error: Option<ErrorKind>,
}

impl TransactionAttempt {
    pub fn new(request: ContractCallRequest, finality: FinalityMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            finality,
            state: AttemptState::Created,
            dry_result: None,
            extrinsic_hash: None,
            extrinsic_index: None,
            block_hash: None,
            error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &ContractCallRequest {
        &self.request
    }

    pub fn finality(&self) -> FinalityMode {
        self.finality
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.error
    }

    fn advance(&mut self, next: AttemptState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid attempt transition from {} to {}",
            self.state,
            next
        );
        trace!("Attempt {} {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    pub fn balance_checked(&mut self) {
        self.advance(AttemptState::BalanceChecked);
    }

    pub fn simulated(&mut self, dry_result: SimulationOutcome) {
        self.dry_result = Some(dry_result);
        self.advance(AttemptState::Simulated);
    }

    pub fn broadcasting(&mut self) {
        self.advance(AttemptState::Broadcasting);
    }

    /// Reject before broadcast. Attaches the dry-run result when one exists.
    pub fn reject(&mut self, mut err: TxError) -> TxError {
        if err.dry_result.is_none() {
            if let Some(dry_result) = &self.dry_result {
                err = err.with_dry_result(dry_result.clone());
            }
        }
        warn!("Attempt {} rejected: {}", self.id, err);
        self.error = Some(err.kind);
        self.advance(AttemptState::Rejected);
        err
    }

    /// Fail after broadcast, attaching everything known about the extrinsic
    fn fail(&mut self, mut err: TxError) -> TxError {
        if err.dry_result.is_none() {
            if let Some(dry_result) = &self.dry_result {
                err = err.with_dry_result(dry_result.clone());
            }
        }
        if let Some(hash) = self.extrinsic_hash {
            err = err.with_extrinsic(hash, self.extrinsic_index, self.block_hash);
        }
        warn!("Attempt {} failed: {}", self.id, err);
        self.error = Some(err.kind);
        self.advance(AttemptState::Failed);
        err
    }

    /// Handle one status update.
    ///
    /// Returns the resolution when `update` is this attempt's terminal
    /// milestone (or an abandonment by the pool), `None` otherwise.
    pub fn handle_update(
        &mut self,
        update: SubmittableResult,
        classifier: &ErrorClassifier,
    ) -> Option<TxResult<TransactionResult>> {
        if self.state.is_terminal() {
            trace!("Attempt {} ignoring {} after resolution", self.id, update.status.name());
            return None;
        }

        self.extrinsic_hash = Some(update.tx_hash);

        if update.status.is_abandoned() {
            let err = TxError::new(
                ErrorKind::Unknown,
                format!("Transaction {} by the pool", update.status.name()),
            );
            return Some(Err(self.fail(err)));
        }

        let Some(block_hash) = self.finality.terminal_block(&update.status) else {
            match &update.status {
                TxStatus::InBlock(block) if self.state == AttemptState::Broadcasting => {
                    debug!("Attempt {} in block {:?}, awaiting finality", self.id, block);
                    self.advance(AttemptState::InBlock);
                }
                TxStatus::Retracted(block) if self.state == AttemptState::InBlock => {
                    debug!("Attempt {} retracted from block {:?}", self.id, block);
                    self.advance(AttemptState::Broadcasting);
                }
                status => trace!("Attempt {} status {}", self.id, status.name()),
            }
            return None;
        };

        self.block_hash = Some(block_hash);
        self.extrinsic_index = update.tx_index;

        if let Some(err) = classifier.classify_block(&update) {
            return Some(Err(self.fail(err)));
        }

        let Some(dry_result) = self.dry_result.clone() else {
            let err = TxError::new(ErrorKind::Unknown, "Transaction broadcast without a dry run");
            return Some(Err(self.fail(err)));
        };
        let success_event = update.success_event().cloned();
        self.advance(AttemptState::Succeeded);
        info!(
            "Attempt {} succeeded in block {:?} ({})",
            self.id,
            block_hash,
            self.finality.label()
        );

        Some(Ok(TransactionResult {
            dry_result,
            extrinsic_hash: update.tx_hash,
            extrinsic_index: update.tx_index,
            block_hash,
            success_event,
            result: update,
        }))
    }

    /// Handle an error delivered through the status subscription
    pub fn handle_stream_error(
        &mut self,
        err: &TransportError,
        classifier: &ErrorClassifier,
    ) -> Option<TxError> {
        if self.state.is_terminal() {
            return None;
        }
        Some(self.fail(classifier.classify_transport(err)))
    }

    /// The subscription ended without a terminal update
    pub fn handle_closed(&mut self) -> Option<TxError> {
        if self.state.is_terminal() {
            return None;
        }
        Some(self.fail(TxError::new(
            ErrorKind::Unknown,
            "Status subscription closed before the transaction was resolved",
        )))
    }

    /// No terminal update arrived within `waited`
    pub fn expire(&mut self, waited: Duration) -> Option<TxError> {
        if self.state.is_terminal() {
            return None;
        }
        Some(self.fail(TxError::new(
            ErrorKind::Timeout,
            format!(
                "No {} status after {}s",
                self.finality.label(),
                waited.as_secs()
            ),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockContractAbi, Phase};
    use crate::types::{AccountId, CallOptions, ContractRef, DecodedOutput, RawCallOutcome};

    use std::sync::Arc;

    fn tx() -> H256 {
        H256::repeat_byte(0xaa)
    }

    fn block() -> H256 {
        H256::repeat_byte(0xbb)
    }

    fn broadcasting(finality: FinalityMode) -> TransactionAttempt {
        let contract = ContractRef::new(AccountId::new("5Contract"), Arc::new(MockContractAbi::new()));
        let request = ContractCallRequest::new(contract, "flip", CallOptions::default(), vec![]);
        let mut attempt = TransactionAttempt::new(request, finality);
        attempt.balance_checked();
        attempt.simulated(SimulationOutcome::new(
            RawCallOutcome::default(),
            DecodedOutput::default(),
        ));
        attempt.broadcasting();
        attempt
    }

    fn update(status: TxStatus, events: Vec<EventRecord>) -> SubmittableResult {
        SubmittableResult::new(status, tx()).with_events(1, events)
    }

    fn system(variant: &str) -> EventRecord {
        EventRecord::new(Phase::ApplyExtrinsic(1), "System", variant)
    }

    #[test]
    fn test_transitions() {
        use AttemptState::*;

        assert!(Created.can_transition_to(BalanceChecked));
        assert!(Created.can_transition_to(Rejected));
        assert!(Simulated.can_transition_to(Broadcasting));
        assert!(InBlock.can_transition_to(Succeeded));
        assert!(!Created.can_transition_to(Broadcasting));
        assert!(!Broadcasting.can_transition_to(Rejected));
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Rejected.can_transition_to(Simulated));
    }

    #[test]
    fn test_in_block_is_terminal_in_development_mode() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::InBlock);

        assert!(attempt.handle_update(update(TxStatus::Ready, vec![]), &classifier).is_none());
        let result = attempt
            .handle_update(
                update(TxStatus::InBlock(block()), vec![system("ExtrinsicSuccess")]),
                &classifier,
            )
            .unwrap()
            .unwrap();

        assert_eq!(result.block_hash, block());
        assert_eq!(result.extrinsic_hash, tx());
        assert_eq!(result.extrinsic_index, Some(1));
        assert_eq!(result.success_event, Some(system("ExtrinsicSuccess")));
        assert_eq!(attempt.state(), AttemptState::Succeeded);
    }

    #[test]
    fn test_live_chain_waits_for_finalized() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::Finalized);

        assert!(attempt
            .handle_update(update(TxStatus::InBlock(block()), vec![system("ExtrinsicSuccess")]), &classifier)
            .is_none());
        assert_eq!(attempt.state(), AttemptState::InBlock);

        let finalized = H256::repeat_byte(0xcc);
        let result = attempt
            .handle_update(
                update(TxStatus::Finalized(finalized), vec![system("ExtrinsicSuccess")]),
                &classifier,
            )
            .unwrap()
            .unwrap();
        assert_eq!(result.block_hash, finalized);
    }

    #[test]
    fn test_failure_event_fails_with_identifiers() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::Finalized);

        let err = attempt
            .handle_update(
                update(TxStatus::Finalized(block()), vec![system("ExtrinsicFailed")]),
                &classifier,
            )
            .unwrap()
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ExtrinsicFailed);
        assert_eq!(err.error_event, Some(system("ExtrinsicFailed")));
        assert_eq!(err.extrinsic_hash, Some(tx()));
        assert_eq!(err.extrinsic_index, Some(1));
        assert_eq!(err.block_hash, Some(block()));
        assert!(err.dry_result.is_some());
        assert_eq!(attempt.state(), AttemptState::Failed);
    }

    #[test]
    fn test_resolves_only_once() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::InBlock);

        assert!(attempt
            .handle_update(update(TxStatus::InBlock(block()), vec![]), &classifier)
            .is_some());
        assert!(attempt
            .handle_update(update(TxStatus::Finalized(block()), vec![system("ExtrinsicFailed")]), &classifier)
            .is_none());
        assert!(attempt.handle_closed().is_none());
        assert!(attempt.expire(Duration::from_secs(1)).is_none());
        assert_eq!(attempt.state(), AttemptState::Succeeded);
    }

    #[test]
    fn test_retracted_block_returns_to_broadcasting() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::Finalized);

        attempt.handle_update(update(TxStatus::InBlock(block()), vec![]), &classifier);
        attempt.handle_update(update(TxStatus::Retracted(block()), vec![]), &classifier);

        assert_eq!(attempt.state(), AttemptState::Broadcasting);
    }

    #[test]
    fn test_abandoned_by_pool() {
        let classifier = ErrorClassifier::default();
        let mut attempt = broadcasting(FinalityMode::Finalized);

        let err = attempt
            .handle_update(update(TxStatus::Dropped, vec![]), &classifier)
            .unwrap()
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(err.message.contains("Dropped"));
        assert_eq!(err.extrinsic_hash, Some(tx()));
        assert_eq!(err.block_hash, None);
    }

    #[test]
    fn test_expire_reports_timeout() {
        let mut attempt = broadcasting(FinalityMode::Finalized);
        let err = attempt.expire(Duration::from_secs(30)).unwrap();

        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(err.message.contains("30s"));
        assert_eq!(attempt.error(), Some(ErrorKind::Timeout));
    }

    #[test]
    fn test_reject_attaches_dry_result() {
        let contract = ContractRef::new(AccountId::new("5Contract"), Arc::new(MockContractAbi::new()));
        let request = ContractCallRequest::new(contract, "flip", CallOptions::default(), vec![]);
        let mut attempt = TransactionAttempt::new(request, FinalityMode::Finalized);
        attempt.balance_checked();
        attempt.simulated(SimulationOutcome::new(RawCallOutcome::default(), DecodedOutput::default()));

        let err = attempt.reject(TxError::from_kind(ErrorKind::UserCancelled));

        assert!(err.dry_result.is_some());
        assert!(err.extrinsic_hash.is_none());
        assert_eq!(attempt.state(), AttemptState::Rejected);
    }
}
