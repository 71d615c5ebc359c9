use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArqConfig {
    /// Number of frames in the stream, sequence numbers `0..total_frames`.
    pub total_frames: u32,
    /// Maximum frames outstanding (sent, unacknowledged) at once.
    pub window_size: u32,
    pub loss_probability: f64,
    pub reorder_probability: f64,
    /// Retransmit timeout per in-flight frame.
    pub timeout_ms: u64,
    /// Base transmission delay is drawn uniformly from this range.
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// A reordered frame is delayed further by a draw from this range.
    pub reorder_extra_min_ms: u64,
    pub reorder_extra_max_ms: u64,
    /// Send attempts allowed per frame before the run is declared
    /// non-convergent.
    pub max_attempts: u32,
    pub seed: u64,
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self {
            total_frames: 10,
            window_size: 4,
            loss_probability: 0.2,
            reorder_probability: 0.2,
            timeout_ms: 2000,
            min_delay_ms: 500,
            max_delay_ms: 1500,
            reorder_extra_min_ms: 1000,
            reorder_extra_max_ms: 2000,
            max_attempts: 16,
            seed: 0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("total_frames must be at least 1")]
    NoFrames,
    #[error("window_size {window_size} must be in 1..={total_frames}")]
    BadWindow { window_size: u32, total_frames: u32 },
    #[error("{name} = {value} is not a probability in [0, 1]")]
    BadProbability { name: &'static str, value: f64 },
    #[error("timeout_ms must be positive")]
    ZeroTimeout,
    #[error("delay range {min}..={max} is inverted")]
    BadDelayRange { min: u64, max: u64 },
    #[error("max_attempts must be at least 1")]
    NoAttempts,
}

impl ArqConfig {
    /// Reject an invalid configuration before any simulation state exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_frames == 0 {
            return Err(ConfigError::NoFrames);
        }
        if self.window_size == 0 || self.window_size > self.total_frames {
            return Err(ConfigError::BadWindow {
                window_size: self.window_size,
                total_frames: self.total_frames,
            });
        }
        for (name, value) in [
            ("loss_probability", self.loss_probability),
            ("reorder_probability", self.reorder_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::BadProbability { name, value });
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::BadDelayRange {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }
        if self.reorder_extra_min_ms > self.reorder_extra_max_ms {
            return Err(ConfigError::BadDelayRange {
                min: self.reorder_extra_min_ms,
                max: self.reorder_extra_max_ms,
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }

    /// A reliable, fixed-latency profile. Handy for tests and scenarios
    /// that script their own faults.
    pub fn reliable(total_frames: u32, window_size: u32) -> Self {
        Self {
            total_frames,
            window_size,
            loss_probability: 0.0,
            reorder_probability: 0.0,
            min_delay_ms: 10,
            max_delay_ms: 10,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ArqConfig::default().validate(), Ok(()));
    }

    #[test]
    fn window_larger_than_stream_is_rejected() {
        let config = ArqConfig {
            total_frames: 4,
            window_size: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BadWindow {
                window_size: 5,
                total_frames: 4
            })
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = ArqConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadWindow { .. })
        ));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let config = ArqConfig {
            loss_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadProbability {
                name: "loss_probability",
                ..
            })
        ));

        let config = ArqConfig {
            reorder_probability: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadProbability {
                name: "reorder_probability",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ArqConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let config = ArqConfig {
            min_delay_ms: 100,
            max_delay_ms: 50,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BadDelayRange { min: 100, max: 50 })
        );
    }
}
