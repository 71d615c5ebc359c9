use serde::{Deserialize, Serialize};

/// One observable simulation event. The ordered event stream (plus the
/// mirrored log lines) is the engine's only external output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Frame dispatched into the channel; `attempt` is 1 for the initial
    /// send, 2+ for retransmissions.
    Send { seq: u32, attempt: u32 },
    /// Attempt dropped by the impairment model.
    Loss { seq: u32, attempt: u32 },
    /// Attempt delayed further, letting later frames overtake it.
    Reorder { seq: u32, extra_delay_ms: u64 },
    /// First acknowledgment for `seq`. Duplicate acks are silent.
    Ack { seq: u32 },
    /// Retransmit timer expired for a still-unacknowledged frame.
    Timeout { seq: u32 },
    /// All frames acknowledged.
    Completed { elapsed_ms: u64 },
}

impl TraceEvent {
    pub fn seq(&self) -> Option<u32> {
        match self {
            TraceEvent::Send { seq, .. }
            | TraceEvent::Loss { seq, .. }
            | TraceEvent::Reorder { seq, .. }
            | TraceEvent::Ack { seq }
            | TraceEvent::Timeout { seq } => Some(*seq),
            TraceEvent::Completed { .. } => None,
        }
    }

    pub fn is_retransmission(&self) -> bool {
        matches!(self, TraceEvent::Send { attempt, .. } if *attempt > 1)
    }
}
