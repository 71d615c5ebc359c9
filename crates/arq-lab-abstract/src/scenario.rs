use crate::config::ArqConfig;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub config: ConfigOverride,
    #[serde(default)]
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ConfigOverride {
    pub total_frames: Option<u32>,
    pub window_size: Option<u32>,
    pub loss_probability: Option<f64>,
    pub reorder_probability: Option<f64>,
    pub timeout_ms: Option<u64>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub seed: Option<u64>,
}

impl ConfigOverride {
    pub fn apply_to(&self, config: &mut ArqConfig) {
        if let Some(v) = self.total_frames {
            config.total_frames = v;
        }
        if let Some(v) = self.window_size {
            config.window_size = v;
        }
        if let Some(v) = self.loss_probability {
            config.loss_probability = v;
        }
        if let Some(v) = self.reorder_probability {
            config.reorder_probability = v;
        }
        if let Some(v) = self.timeout_ms {
            config.timeout_ms = v;
        }
        if let Some(v) = self.min_delay_ms {
            config.min_delay_ms = v;
        }
        if let Some(v) = self.max_delay_ms {
            config.max_delay_ms = v;
        }
        if let Some(v) = self.max_attempts {
            config.max_attempts = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAction {
    /// Deterministically drop the next channel attempt carrying `seq`.
    /// Listing the same seq twice drops its first two attempts, and so on.
    DropNextSend { seq: u32 },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestAssertion {
    /// Assert the run converged (all frames acknowledged).
    Completed,
    /// Assert the total number of send attempts is within range.
    TotalSends { min: u32, max: Option<u32> },
    /// Assert frame `seq` was retransmitted exactly `count` times.
    RetransmissionsFor { seq: u32, count: u32 },
    /// Assert the simulated run finished within `ms`.
    MaxElapsedMs { ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_parses_from_toml() {
        let scenario: TestScenario = toml::from_str(
            r#"
            name = "first-send-of-2-lost"
            description = "drop the first attempt of frame 2"

            [config]
            total_frames = 5
            window_size = 2
            loss_probability = 0.0
            reorder_probability = 0.0

            [[actions]]
            type = "drop_next_send"
            seq = 2

            [[assertions]]
            type = "completed"

            [[assertions]]
            type = "retransmissions_for"
            seq = 2
            count = 1
            "#,
        )
        .expect("scenario should parse");

        assert_eq!(scenario.name, "first-send-of-2-lost");
        assert_eq!(scenario.actions.len(), 1);
        assert!(matches!(
            scenario.actions[0],
            TestAction::DropNextSend { seq: 2 }
        ));
        assert_eq!(scenario.assertions.len(), 2);

        let mut config = ArqConfig::default();
        scenario.config.apply_to(&mut config);
        assert_eq!(config.total_frames, 5);
        assert_eq!(config.window_size, 2);
        assert_eq!(config.loss_probability, 0.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.timeout_ms, 2000);
    }
}
