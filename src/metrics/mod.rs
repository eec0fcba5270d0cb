//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Query and dry-run outcomes
//! - Transaction submissions and terminal outcomes
//! - Time from broadcast to the terminal milestone

use crate::error::ErrorKind;

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};

lazy_static! {
    pub static ref QUERIES: CounterVec = register_counter_vec!(
        "contract_caller_queries_total",
        "Total contract queries by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref DRY_RUNS: CounterVec = register_counter_vec!(
        "contract_caller_dry_runs_total",
        "Total dry runs by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref TX_SUBMITTED: IntCounter = register_int_counter!(
        "contract_caller_transactions_submitted_total",
        "Total transactions broadcast"
    ).unwrap();

    pub static ref TX_SUCCEEDED: CounterVec = register_counter_vec!(
        "contract_caller_transactions_succeeded_total",
        "Total transactions resolved successfully, by terminal milestone",
        &["milestone"]
    ).unwrap();

    pub static ref TX_REJECTED: CounterVec = register_counter_vec!(
        "contract_caller_transactions_rejected_total",
        "Total transactions rejected, by error kind",
        &["kind"]
    ).unwrap();

    pub static ref TX_LATENCY: HistogramVec = register_histogram_vec!(
        "contract_caller_transaction_latency_seconds",
        "Time from broadcast to the terminal milestone",
        &["milestone"],
        vec![1.0, 2.5, 6.0, 12.0, 18.0, 30.0, 60.0, 120.0, 300.0]
    ).unwrap();
}

/// Encode every registered metric in the Prometheus text format
pub fn render() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

// Helper functions to record metrics

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_query(ok: bool) {
    QUERIES.with_label_values(&[outcome(ok)]).inc();
}

pub fn record_dry_run(ok: bool) {
    DRY_RUNS.with_label_values(&[outcome(ok)]).inc();
}

pub fn record_tx_submitted() {
    TX_SUBMITTED.inc();
}

pub fn record_tx_succeeded(milestone: &str, latency_secs: f64) {
    TX_SUCCEEDED.with_label_values(&[milestone]).inc();
    TX_LATENCY.with_label_values(&[milestone]).observe(latency_secs);
}

pub fn record_tx_rejected(kind: ErrorKind) {
    TX_REJECTED.with_label_values(&[kind.label()]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_metrics() {
        record_tx_rejected(ErrorKind::TokenBelowMinimum);
        record_tx_succeeded("finalized", 12.0);

        let text = render().unwrap();

        assert!(text.contains("contract_caller_transactions_rejected_total"));
        assert!(text.contains("kind=\"token_below_minimum\""));
        assert!(text.contains("contract_caller_transaction_latency_seconds"));
    }
}
