pub mod channel;
pub mod engine;
pub mod error;
pub mod timers;
pub mod trace;
pub mod window;

pub use channel::{Delivery, ImpairedChannel};
pub use engine::Simulator;
pub use error::EngineError;
pub use timers::RetransmitTimers;
pub use trace::{SimulationReport, TraceRecorder};
pub use window::{AckOutcome, SlidingWindow};
