use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An acknowledgment arrived for a frame that was never sent. This
    /// cannot happen through the simulated channel and indicates a
    /// construction bug upstream; the run terminates immediately.
    #[error("acknowledgment for unsent frame {seq} (next_seq = {next_seq})")]
    ProtocolViolation { seq: u32, next_seq: u32 },

    /// A frame could not be delivered within the configured attempt
    /// bound; the run is reported as non-convergent instead of retrying
    /// forever.
    #[error("frame {seq} not delivered after {attempts} attempts")]
    RetriesExhausted { seq: u32, attempts: u32 },
}
