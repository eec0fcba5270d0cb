//! Gas estimation by dry-running the call against current chain state

use crate::chain::{ChainTransport, ContractCall};
use crate::error::CallError;
use crate::metrics;
use crate::types::{AccountId, ContractCallRequest, SimulationOutcome};

use std::sync::Arc;
use tracing::{debug, warn};

/// Simulates contract calls to obtain a gas estimate and detect failures
pub struct DryRunEstimator {
    transport: Arc<dyn ChainTransport>,
}

impl DryRunEstimator {
    pub fn new(transport: Arc<dyn ChainTransport>) -> Self {
        Self { transport }
    }

    /// Dry-run `request` as `origin`.
    ///
    /// Any caller-supplied gas limit is dropped so the node meters the call
    /// itself; `gas_required` of the outcome is the estimate.
    pub async fn simulate(
        &self,
        origin: &AccountId,
        request: &ContractCallRequest,
    ) -> Result<SimulationOutcome, CallError> {
        let options = request.options().without_gas_limit();
        let input = request.encode()?;

        debug!(
            "Dry run of {} on {} (selector 0x{})",
            request.method(),
            request.contract_address(),
            hex::encode(input.get(..4).unwrap_or(&input))
        );

        let raw = self
            .transport
            .contract_call(ContractCall {
                origin: origin.clone(),
                dest: request.contract_address().clone(),
                value: options.value.unwrap_or(0),
                gas_limit: options.gas_limit,
                storage_deposit_limit: options.storage_deposit_limit,
                input,
            })
            .await;

        metrics::record_dry_run(raw.is_ok());
        let raw = raw.map_err(|e| {
            warn!("Dry run of {} failed: {}", request.method(), e);
            e
        })?;

        let decoded = request.contract().abi.decode_output(&raw, request.method());
        let outcome = SimulationOutcome::new(raw, decoded);

        debug!(
            "Dry run of {} required {} (consumed {}), is_error={}",
            request.method(),
            outcome.gas_required,
            outcome.gas_consumed,
            outcome.is_error
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockChainTransport, MockContractAbi};
    use crate::error::{AbiError, TransportError};
    use crate::types::{CallOptions, ContractRef, DecodedOutput, RawCallOutcome, Weight};

    use serde_json::json;

    fn request(options: CallOptions) -> ContractCallRequest {
        let mut abi = MockContractAbi::new();
        abi.expect_encode_call()
            .returning(|_, _| Ok(vec![0xde, 0xad, 0xbe, 0xef, 0x01]));
        abi.expect_decode_output().returning(|_, _| DecodedOutput {
            is_error: false,
            decoded_output: Some("42".to_string()),
        });
        let contract = ContractRef::new(AccountId::new("5Contract"), Arc::new(abi));
        ContractCallRequest::new(contract, "get", options, vec![json!(1)])
    }

    #[tokio::test]
    async fn test_simulate_strips_caller_gas_limit() {
        let mut transport = MockChainTransport::new();
        transport
            .expect_contract_call()
            .withf(|call| {
                call.gas_limit.is_none()
                    && call.value == 10
                    && call.storage_deposit_limit == Some(3)
                    && call.origin.as_str() == "5Alice"
                    && call.dest.as_str() == "5Contract"
                    && call.input == vec![0xde, 0xad, 0xbe, 0xef, 0x01]
            })
            .times(1)
            .returning(|_| {
                Ok(RawCallOutcome {
                    gas_required: Weight::new(5_000, 100),
                    gas_consumed: Weight::new(4_000, 90),
                    ..Default::default()
                })
            });

        let options = CallOptions::default()
            .with_value(10)
            .with_gas_limit(Weight::new(1, 1))
            .with_storage_deposit_limit(3);
        let request = request(options);
        let estimator = DryRunEstimator::new(Arc::new(transport));

        let outcome = estimator
            .simulate(&AccountId::new("5Alice"), &request)
            .await
            .unwrap();

        assert_eq!(outcome.gas_required, Weight::new(5_000, 100));
        assert_eq!(outcome.decoded_output.as_deref(), Some("42"));
        assert!(!outcome.is_error);
        // Caller's options are left as they were
        assert_eq!(request.options().gas_limit, Some(Weight::new(1, 1)));
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let mut transport = MockChainTransport::new();
        transport
            .expect_contract_call()
            .returning(|_| Err(TransportError::rpc(-32000, "state unavailable")));
        let estimator = DryRunEstimator::new(Arc::new(transport));

        let err = estimator
            .simulate(&AccountId::new("5Alice"), &request(CallOptions::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::Transport(_)));
    }

    #[tokio::test]
    async fn test_encoding_error_skips_transport() {
        let mut transport = MockChainTransport::new();
        transport.expect_contract_call().never();

        let mut abi = MockContractAbi::new();
        abi.expect_encode_call()
            .returning(|method, _| Err(AbiError::MessageNotFound(method.to_string())));
        let contract = ContractRef::new(AccountId::new("5Contract"), Arc::new(abi));
        let request = ContractCallRequest::new(contract, "missing", CallOptions::default(), vec![]);

        let err = DryRunEstimator::new(Arc::new(transport))
            .simulate(&AccountId::new("5Alice"), &request)
            .await
            .unwrap_err();

        assert_eq!(err, CallError::Abi(AbiError::MessageNotFound("missing".into())));
    }
}
