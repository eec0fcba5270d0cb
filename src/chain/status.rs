//! Extrinsic status updates and runtime event records

use primitive_types::H256;
use serde::{Deserialize, Serialize};

/// Pool and block lifecycle of a submitted extrinsic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Future,
    Ready,
    Broadcast(Vec<String>),
    InBlock(H256),
    Retracted(H256),
    FinalityTimeout(H256),
    Finalized(H256),
    Usurped(H256),
    Dropped,
    Invalid,
}

impl TxStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TxStatus::Future => "Future",
            TxStatus::Ready => "Ready",
            TxStatus::Broadcast(_) => "Broadcast",
            TxStatus::InBlock(_) => "InBlock",
            TxStatus::Retracted(_) => "Retracted",
            TxStatus::FinalityTimeout(_) => "FinalityTimeout",
            TxStatus::Finalized(_) => "Finalized",
            TxStatus::Usurped(_) => "Usurped",
            TxStatus::Dropped => "Dropped",
            TxStatus::Invalid => "Invalid",
        }
    }

    pub fn as_in_block(&self) -> Option<H256> {
        match self {
            TxStatus::InBlock(hash) => Some(*hash),
            _ => None,
        }
    }

    pub fn as_finalized(&self) -> Option<H256> {
        match self {
            TxStatus::Finalized(hash) => Some(*hash),
            _ => None,
        }
    }

    /// The pool gave up on the extrinsic; no block milestone will follow
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            TxStatus::Usurped(_) | TxStatus::Dropped | TxStatus::Invalid
        )
    }
}

/// Point in block execution at which an event was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

/// Runtime event attached to a status update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub phase: Phase,
    pub pallet: String,
    pub variant: String,
    /// Decoded event fields, as rendered by the transport
    pub data: serde_json::Value,
    pub topics: Vec<H256>,
}

impl EventRecord {
    pub fn new(phase: Phase, pallet: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            phase,
            pallet: pallet.into(),
            variant: variant.into(),
            data: serde_json::Value::Null,
            topics: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn is(&self, pallet: &str, variant: &str) -> bool {
        self.pallet == pallet && self.variant == variant
    }

    pub fn is_extrinsic_success(&self) -> bool {
        self.is("System", "ExtrinsicSuccess")
    }

    pub fn is_extrinsic_failed(&self) -> bool {
        self.is("System", "ExtrinsicFailed")
    }
}

/// One status notification delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittableResult {
    pub status: TxStatus,
    /// Events emitted by this extrinsic, once it is in a block
    pub events: Vec<EventRecord>,
    pub tx_hash: H256,
    pub tx_index: Option<u32>,
}

impl SubmittableResult {
    pub fn new(status: TxStatus, tx_hash: H256) -> Self {
        Self {
            status,
            events: Vec::new(),
            tx_hash,
            tx_index: None,
        }
    }

    pub fn with_events(mut self, tx_index: u32, events: Vec<EventRecord>) -> Self {
        self.tx_index = Some(tx_index);
        self.events = events;
        self
    }

    pub fn failure_event(&self) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.is_extrinsic_failed())
    }

    pub fn success_event(&self) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.is_extrinsic_success())
    }
}
