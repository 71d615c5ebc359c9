use arq_lab_abstract::ArqConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What the channel decided to do with one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Attempt lost in transit; no acknowledgment will come back.
    Dropped,
    /// Attempt delivered after `delay_ms` (plus the reorder penalty, if
    /// the frame was reordered relative to other in-flight frames).
    Delivered {
        delay_ms: u64,
        reorder_extra_ms: Option<u64>,
    },
}

/// Fault-injecting channel model. Decides loss, delay, and reordering for
/// each attempt; the asynchronous part (waiting out the delay, delivering
/// the ack) is the orchestrator's job.
///
/// Every attempt is an independent draw from a single seeded RNG, so a
/// whole run is reproducible from `config.seed`. Scripted drops are
/// checked before any random draw and consume no randomness.
pub struct ImpairedChannel {
    loss_probability: f64,
    reorder_probability: f64,
    min_delay_ms: u64,
    max_delay_ms: u64,
    reorder_extra_min_ms: u64,
    reorder_extra_max_ms: u64,
    rng: StdRng,
    drop_next: Vec<u32>,
}

impl ImpairedChannel {
    pub fn new(config: &ArqConfig) -> Self {
        Self {
            loss_probability: config.loss_probability,
            reorder_probability: config.reorder_probability,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            reorder_extra_min_ms: config.reorder_extra_min_ms,
            reorder_extra_max_ms: config.reorder_extra_max_ms,
            rng: StdRng::seed_from_u64(config.seed),
            drop_next: Vec::new(),
        }
    }

    /// Deterministic fault: drop the next attempt carrying `seq`.
    /// Scripting the same seq twice drops its first two attempts.
    pub fn script_drop(&mut self, seq: u32) {
        self.drop_next.push(seq);
    }

    /// Decide the fate of one send attempt (initial or retransmission).
    pub fn plan_attempt(&mut self, seq: u32) -> Delivery {
        if let Some(pos) = self.drop_next.iter().position(|s| *s == seq) {
            self.drop_next.remove(pos);
            return Delivery::Dropped;
        }

        if self.rng.random::<f64>() < self.loss_probability {
            return Delivery::Dropped;
        }

        let delay_ms = self.rng.random_range(self.min_delay_ms..=self.max_delay_ms);
        let reorder_extra_ms = if self.rng.random::<f64>() < self.reorder_probability {
            Some(
                self.rng
                    .random_range(self.reorder_extra_min_ms..=self.reorder_extra_max_ms),
            )
        } else {
            None
        };

        Delivery::Delivered {
            delay_ms,
            reorder_extra_ms,
        }
    }
}
