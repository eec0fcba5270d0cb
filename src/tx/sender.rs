//! Transaction submitter: pre-flight checks, dry run, broadcast and status tracking

use super::attempt::{TransactionAttempt, TransactionResult};
use super::balance::{BalanceCheckError, BalanceGuard};
use super::classifier::ErrorClassifier;
use super::gas::DryRunEstimator;
use crate::chain::{
    BalanceQuery, ChainTransport, ExtrinsicCall, FinalityMode, StatusSubscription,
    SubmittableResult,
};
use crate::config::FinalityConfig;
use crate::error::{CallError, ErrorKind, TxError, TxResult};
use crate::metrics;
use crate::types::{AccountId, ContractCallRequest};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, info_span, Instrument};

/// Callback invoked with every status update of a broadcast transaction
pub type StatusObserver = Box<dyn FnMut(&SubmittableResult) + Send>;

/// Drives transaction attempts from balance check to terminal resolution
pub struct TransactionSubmitter {
    /// Chain connection
    transport: Arc<dyn ChainTransport>,
    /// Balance pre-flight check
    balance_guard: BalanceGuard,
    /// Dry-run gas estimation
    estimator: DryRunEstimator,
    /// Error classification
    classifier: Arc<ErrorClassifier>,
    /// Runtime chain names where inclusion in a block is terminal
    development_chains: Vec<String>,
    /// Bound on waiting for the terminal status
    timeout: Option<Duration>,
}

impl TransactionSubmitter {
    pub fn new(
        transport: Arc<dyn ChainTransport>,
        balances: Arc<dyn BalanceQuery>,
        classifier: Arc<ErrorClassifier>,
        finality: &FinalityConfig,
    ) -> Self {
        Self {
            estimator: DryRunEstimator::new(transport.clone()),
            balance_guard: BalanceGuard::new(balances),
            transport,
            classifier,
            development_chains: finality.development_chains.clone(),
            timeout: finality.timeout(),
        }
    }

    /// Submit `request` signed by `signer` and wait for its terminal milestone
    pub async fn submit(
        &self,
        signer: &AccountId,
        request: ContractCallRequest,
        observer: Option<StatusObserver>,
    ) -> TxResult<TransactionResult> {
        let finality =
            FinalityMode::for_runtime_chain(&self.transport.runtime_chain(), &self.development_chains);
        let mut attempt = TransactionAttempt::new(request, finality);

        let span = info_span!(
            "transaction",
            attempt = %attempt.id(),
            method = %attempt.request().method(),
            contract = %attempt.request().contract_address(),
        );

        let outcome = self
            .run(&mut attempt, signer, observer)
            .instrument(span)
            .await;

        if let Err(err) = &outcome {
            metrics::record_tx_rejected(err.kind);
        }
        outcome
    }

    async fn run(
        &self,
        attempt: &mut TransactionAttempt,
        signer: &AccountId,
        observer: Option<StatusObserver>,
    ) -> TxResult<TransactionResult> {
        // Check balance before spending a dry run on it
        let value = attempt.request().options().value;
        match self.balance_guard.check(signer, value).await {
            Ok(_) => attempt.balance_checked(),
            Err(BalanceCheckError::BelowMinimum { .. }) => {
                return Err(attempt.reject(TxError::from_kind(ErrorKind::TokenBelowMinimum)));
            }
            Err(BalanceCheckError::Query(e)) => {
                error!("Balance query failed: {}", e);
                return Err(attempt.reject(self.classifier.classify_transport(&e)));
            }
        }

        // Dry run for the gas estimate and early contract errors
        let dry_result = match self.estimator.simulate(signer, attempt.request()).await {
            Ok(outcome) => outcome,
            Err(err) => return Err(attempt.reject(self.classify_call_error(&err))),
        };
        if let Some(err) = self.classifier.classify_simulation(&dry_result) {
            return Err(attempt.reject(err));
        }
        let gas_limit = dry_result.gas_required;
        attempt.simulated(dry_result);

        // Estimated gas replaces whatever limit the caller passed
        let options = attempt.request().options().with_gas_limit(gas_limit);
        let input = match attempt.request().encode() {
            Ok(input) => input,
            Err(err) => return Err(attempt.reject(self.classify_call_error(&err.into()))),
        };
        let call = ExtrinsicCall {
            dest: attempt.request().contract_address().clone(),
            value: options.value.unwrap_or(0),
            gas_limit,
            storage_deposit_limit: options.storage_deposit_limit,
            input,
        };

        let mut subscription = match self.transport.sign_and_submit(signer, call).await {
            Ok(subscription) => subscription,
            Err(e) => {
                error!("Failed to sign and submit: {}", e);
                return Err(attempt.reject(self.classifier.classify_transport(&e)));
            }
        };
        attempt.broadcasting();
        metrics::record_tx_submitted();
        info!(
            "Transaction broadcast with gas limit {}, waiting for {} status",
            gas_limit,
            attempt.finality().label()
        );

        let started = Instant::now();
        let resolution = match self.timeout {
            Some(limit) => {
                let watched = timeout(limit, self.watch(attempt, &mut subscription, observer)).await;
                match watched {
                    Ok(resolution) => resolution,
                    Err(_) => Err(self.expired(attempt, limit)),
                }
            }
            None => self.watch(attempt, &mut subscription, observer).await,
        };
        subscription.release();

        if resolution.is_ok() {
            metrics::record_tx_succeeded(
                attempt.finality().label(),
                started.elapsed().as_secs_f64(),
            );
        }
        resolution
    }

    /// Feed status updates to the attempt until it resolves
    async fn watch(
        &self,
        attempt: &mut TransactionAttempt,
        subscription: &mut StatusSubscription,
        mut observer: Option<StatusObserver>,
    ) -> TxResult<TransactionResult> {
        while let Some(update) = subscription.next().await {
            let resolution = match update {
                Ok(update) => {
                    debug!("Status update: {}", update.status.name());
                    if let Some(observer) = observer.as_mut() {
                        observer(&update);
                    }
                    attempt.handle_update(update, &self.classifier)
                }
                Err(e) => {
                    error!("Status subscription error: {}", e);
                    attempt
                        .handle_stream_error(&e, &self.classifier)
                        .map(Err)
                }
            };

            if let Some(resolution) = resolution {
                subscription.release();
                return resolution;
            }
        }

        Err(attempt.handle_closed().unwrap_or_else(|| {
            TxError::new(ErrorKind::Unknown, "Status subscription closed")
        }))
    }

    fn expired(&self, attempt: &mut TransactionAttempt, limit: Duration) -> TxError {
        error!("No terminal status after {:?}", limit);
        attempt
            .expire(limit)
            .unwrap_or_else(|| TxError::from_kind(ErrorKind::Timeout))
    }

    fn classify_call_error(&self, err: &CallError) -> TxError {
        match err {
            CallError::Transport(e) => self.classifier.classify_transport(e),
            CallError::Abi(e) => TxError::new(ErrorKind::Unknown, e.to_string()),
        }
    }
}
