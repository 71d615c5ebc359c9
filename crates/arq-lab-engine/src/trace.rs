use std::sync::{Mutex, PoisonError};

use arq_lab_abstract::{ArqConfig, TraceEvent};
use serde::Serialize;

/// Ordered event log shared by the orchestrator and its worker tasks.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    events: Mutex<Vec<TraceEvent>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: TraceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn snapshot(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Serializable summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub config: ArqConfig,
    pub elapsed_ms: u64,
    /// Send attempts dispatched, counting retransmissions.
    pub total_sends: u32,
    /// Send attempts beyond the first, per frame, summed.
    pub retransmissions: u32,
    /// Acknowledgments absorbed silently by idempotence.
    pub duplicate_acks: u32,
    pub events: Vec<TraceEvent>,
}

impl SimulationReport {
    /// Number of retransmissions observed for one frame.
    pub fn retransmissions_for(&self, seq: u32) -> u32 {
        self.events
            .iter()
            .filter(|e| e.seq() == Some(seq) && e.is_retransmission())
            .count() as u32
    }
}
