use std::collections::HashMap;

/// Retransmit timer bookkeeping, one logical timer per outstanding seq.
///
/// Cancellation is a generation bump: an expiry that arrives carrying a
/// stale generation is discarded. The expiry path must still re-check the
/// acknowledgment table under the same lock, since a cancel request can
/// race with an expiry already in flight.
#[derive(Debug, Default)]
pub struct RetransmitTimers {
    generations: HashMap<u32, u64>,
}

impl RetransmitTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or replace) the timer for `seq`, returning the generation the
    /// pending expiry must present to be honored.
    pub fn arm(&mut self, seq: u32) -> u64 {
        let generation = self.generations.entry(seq).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Invalidate any pending expiry for `seq`.
    pub fn cancel(&mut self, seq: u32) {
        let generation = self.generations.entry(seq).or_insert(0);
        *generation += 1;
    }

    /// Whether an expiry carrying `generation` is still the live timer.
    pub fn is_current(&self, seq: u32, generation: u64) -> bool {
        self.generations.get(&seq) == Some(&generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_timer_is_current_until_cancelled() {
        let mut timers = RetransmitTimers::new();
        let generation = timers.arm(3);
        assert!(timers.is_current(3, generation));
        timers.cancel(3);
        assert!(!timers.is_current(3, generation));
    }

    #[test]
    fn rearming_invalidates_the_previous_expiry() {
        let mut timers = RetransmitTimers::new();
        let first = timers.arm(1);
        let second = timers.arm(1);
        assert!(!timers.is_current(1, first));
        assert!(timers.is_current(1, second));
    }

    #[test]
    fn unknown_seq_is_never_current() {
        let timers = RetransmitTimers::new();
        assert!(!timers.is_current(9, 1));
    }

    #[test]
    fn generations_are_independent_per_seq() {
        let mut timers = RetransmitTimers::new();
        let a = timers.arm(0);
        let b = timers.arm(1);
        timers.cancel(0);
        assert!(!timers.is_current(0, a));
        assert!(timers.is_current(1, b));
    }
}
