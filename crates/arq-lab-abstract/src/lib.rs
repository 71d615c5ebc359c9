pub mod config;
pub mod event;
pub mod frame;
pub mod scenario;

pub use config::{ArqConfig, ConfigError};
pub use event::TraceEvent;
pub use frame::Frame;
pub use scenario::{ConfigOverride, TestAction, TestAssertion, TestScenario};
