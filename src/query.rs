//! Read-only contract calls

use crate::chain::{ChainTransport, ContractCall};
use crate::error::CallError;
use crate::metrics;
use crate::types::{AccountId, ContractCallRequest, SimulationOutcome};

use std::sync::Arc;
use tracing::{debug, warn};

/// Executes contract queries: no balance check, no signing, no broadcast
pub struct QueryExecutor {
    transport: Arc<dyn ChainTransport>,
}

impl QueryExecutor {
    pub fn new(transport: Arc<dyn ChainTransport>) -> Self {
        Self { transport }
    }

    /// Read `request` as `origin`.
    ///
    /// A gas limit set by the caller is honoured; otherwise the chain's
    /// read-call ceiling is used. Errors are returned unclassified.
    pub async fn query(
        &self,
        origin: &AccountId,
        request: &ContractCallRequest,
    ) -> Result<SimulationOutcome, CallError> {
        let options = *request.options();
        let gas_limit = options
            .gas_limit
            .unwrap_or_else(|| self.transport.max_gas_limit());
        let input = request.encode()?;

        debug!(
            "Query {} on {} with gas limit {}",
            request.method(),
            request.contract_address(),
            gas_limit
        );

        let raw = self
            .transport
            .contract_call(ContractCall {
                origin: origin.clone(),
                dest: request.contract_address().clone(),
                value: options.value.unwrap_or(0),
                gas_limit: Some(gas_limit),
                storage_deposit_limit: options.storage_deposit_limit,
                input,
            })
            .await;

        metrics::record_query(raw.is_ok());
        let raw = raw.map_err(|e| {
            warn!("Query {} failed: {}", request.method(), e);
            e
        })?;

        let decoded = request.contract().abi.decode_output(&raw, request.method());
        Ok(SimulationOutcome::new(raw, decoded))
    }
}
