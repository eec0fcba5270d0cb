//! Public entry point: query, simulate and transact against deployed contracts

use crate::chain::{BalanceQuery, ChainTransport};
use crate::config::Settings;
use crate::error::{CallError, TxResult};
use crate::query::QueryExecutor;
use crate::tx::{
    DryRunEstimator, ErrorClassifier, StatusObserver, TransactionResult, TransactionSubmitter,
};
use crate::types::{
    AccountId, CallArg, CallOptions, ContractCallRequest, ContractRef, SimulationOutcome,
};

use std::sync::Arc;

/// Contract caller bound to one chain connection
pub struct ContractCaller {
    queries: QueryExecutor,
    estimator: DryRunEstimator,
    submitter: TransactionSubmitter,
}

impl ContractCaller {
    pub fn new(
        transport: Arc<dyn ChainTransport>,
        balances: Arc<dyn BalanceQuery>,
        settings: &Settings,
    ) -> Result<Self, regex::Error> {
        let classifier = Arc::new(ErrorClassifier::new(&settings.classifier)?);

        Ok(Self {
            queries: QueryExecutor::new(transport.clone()),
            estimator: DryRunEstimator::new(transport.clone()),
            submitter: TransactionSubmitter::new(
                transport,
                balances,
                classifier,
                &settings.finality,
            ),
        })
    }

    /// Read contract state as `account`, without signing
    pub async fn query(
        &self,
        account: &AccountId,
        contract: &ContractRef,
        method: &str,
        options: CallOptions,
        args: Vec<CallArg>,
    ) -> Result<SimulationOutcome, CallError> {
        let request = ContractCallRequest::new(contract.clone(), method, options, args);
        self.queries.query(account, &request).await
    }

    /// Dry-run a call as `account`, for estimation or validation
    pub async fn simulate(
        &self,
        account: &AccountId,
        contract: &ContractRef,
        method: &str,
        options: CallOptions,
        args: Vec<CallArg>,
    ) -> Result<SimulationOutcome, CallError> {
        let request = ContractCallRequest::new(contract.clone(), method, options, args);
        self.estimator.simulate(account, &request).await
    }

    /// Sign and submit a call as `account`, resolving at the chain's
    /// terminal milestone
    pub async fn transaction(
        &self,
        account: &AccountId,
        contract: &ContractRef,
        method: &str,
        options: CallOptions,
        args: Vec<CallArg>,
        observer: Option<StatusObserver>,
    ) -> TxResult<TransactionResult> {
        let request = ContractCallRequest::new(contract.clone(), method, options, args);
        self.submitter.submit(account, request, observer).await
    }
}
