use crate::error::EngineError;

/// Result of recording an acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// First acknowledgment for this frame; the window may have slid.
    First,
    /// Frame was already acknowledged (stray duplicate delivery). No-op.
    Duplicate,
}

/// Sender-side sliding window: the acknowledgment table, the window
/// pointers, and the transition rules that slide them.
///
/// Invariants, maintained by every operation:
/// - `base <= next_seq <= total_frames`
/// - `next_seq - base <= window_size`
/// - `base` is the smallest unacknowledged seq, or `total_frames` once
///   everything is acknowledged. It never retreats.
#[derive(Debug)]
pub struct SlidingWindow {
    window_size: u32,
    base: u32,
    next_seq: u32,
    acked: Vec<bool>,
    attempts: Vec<u32>,
}

impl SlidingWindow {
    pub fn new(total_frames: u32, window_size: u32) -> Self {
        Self {
            window_size,
            base: 0,
            next_seq: 0,
            acked: vec![false; total_frames as usize],
            attempts: vec![0; total_frames as usize],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    pub fn total_frames(&self) -> u32 {
        self.acked.len() as u32
    }

    /// Frames currently admitted and not yet slid past: `next_seq - base`.
    pub fn outstanding(&self) -> u32 {
        self.next_seq - self.base
    }

    pub fn is_acked(&self, seq: u32) -> bool {
        self.acked.get(seq as usize).copied().unwrap_or(false)
    }

    /// Admit the next frame if the window has room and the stream is not
    /// exhausted. This is the backpressure point: a full window returns
    /// `None` until an acknowledgment slides `base` forward.
    pub fn admit(&mut self) -> Option<u32> {
        if self.next_seq < self.base + self.window_size && self.next_seq < self.total_frames() {
            let seq = self.next_seq;
            self.next_seq += 1;
            Some(seq)
        } else {
            None
        }
    }

    /// Record an acknowledgment for `seq`.
    ///
    /// Duplicates (including acks below `base`) are idempotent no-ops.
    /// An ack for a never-sent frame is a protocol violation. On a first
    /// ack, `base` advances through consecutive acknowledged entries; the
    /// advance depends only on the table, not on which ack triggered it.
    pub fn record_ack(&mut self, seq: u32) -> Result<AckOutcome, EngineError> {
        if seq >= self.next_seq {
            return Err(EngineError::ProtocolViolation {
                seq,
                next_seq: self.next_seq,
            });
        }
        if self.acked[seq as usize] {
            return Ok(AckOutcome::Duplicate);
        }
        self.acked[seq as usize] = true;
        while self.base < self.total_frames() && self.acked[self.base as usize] {
            self.base += 1;
        }
        Ok(AckOutcome::First)
    }

    /// Count a send attempt for `seq` and return the new total (the
    /// initial send is attempt 1).
    pub fn note_attempt(&mut self, seq: u32) -> u32 {
        self.attempts[seq as usize] += 1;
        self.attempts[seq as usize]
    }

    pub fn attempts(&self, seq: u32) -> u32 {
        self.attempts[seq as usize]
    }

    pub fn is_complete(&self) -> bool {
        self.base == self.total_frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_stops_at_window_size() {
        let mut window = SlidingWindow::new(5, 2);
        assert_eq!(window.admit(), Some(0));
        assert_eq!(window.admit(), Some(1));
        // Window full: next_seq - base == window_size.
        assert_eq!(window.outstanding(), 2);
        assert_eq!(window.admit(), None);
        assert_eq!(window.admit(), None);
    }

    #[test]
    fn admission_stops_at_stream_end() {
        let mut window = SlidingWindow::new(2, 4);
        assert_eq!(window.admit(), Some(0));
        assert_eq!(window.admit(), Some(1));
        assert_eq!(window.admit(), None);
    }

    #[test]
    fn ack_slides_base_and_reopens_window() {
        let mut window = SlidingWindow::new(5, 2);
        window.admit();
        window.admit();
        assert_eq!(window.record_ack(0), Ok(AckOutcome::First));
        assert_eq!(window.base(), 1);
        assert_eq!(window.admit(), Some(2));
        assert_eq!(window.admit(), None);
    }

    #[test]
    fn out_of_order_ack_holds_base_then_jumps() {
        let mut window = SlidingWindow::new(5, 2);
        window.admit();
        window.admit();
        // Ack 1 first: recorded, but 0 is still missing.
        assert_eq!(window.record_ack(1), Ok(AckOutcome::First));
        assert_eq!(window.base(), 0);
        // Ack 0: base jumps past both in one step.
        assert_eq!(window.record_ack(0), Ok(AckOutcome::First));
        assert_eq!(window.base(), 2);
    }

    #[test]
    fn duplicate_ack_is_idempotent() {
        let mut window = SlidingWindow::new(3, 3);
        window.admit();
        window.admit();
        assert_eq!(window.record_ack(0), Ok(AckOutcome::First));
        let base = window.base();
        let next_seq = window.next_seq();
        assert_eq!(window.record_ack(0), Ok(AckOutcome::Duplicate));
        assert_eq!(window.base(), base);
        assert_eq!(window.next_seq(), next_seq);
    }

    #[test]
    fn ack_below_base_is_accepted_silently() {
        let mut window = SlidingWindow::new(3, 1);
        window.admit();
        window.record_ack(0).unwrap();
        window.admit();
        assert_eq!(window.base(), 1);
        assert_eq!(window.record_ack(0), Ok(AckOutcome::Duplicate));
        assert_eq!(window.base(), 1);
    }

    #[test]
    fn ack_for_unsent_frame_is_a_protocol_violation() {
        let mut window = SlidingWindow::new(5, 2);
        window.admit();
        assert_eq!(
            window.record_ack(3),
            Err(EngineError::ProtocolViolation { seq: 3, next_seq: 1 })
        );
    }

    #[test]
    fn base_and_next_seq_are_monotone() {
        let mut window = SlidingWindow::new(4, 2);
        let mut last_base = 0;
        let mut last_next = 0;
        let acks = [1u32, 0, 2, 3];
        let mut ack_iter = acks.iter();
        loop {
            while window.admit().is_some() {}
            assert!(window.outstanding() <= 2);
            assert!(window.base() >= last_base);
            assert!(window.next_seq() >= last_next);
            last_base = window.base();
            last_next = window.next_seq();
            match ack_iter.next() {
                Some(&seq) => {
                    window.record_ack(seq).unwrap();
                }
                None => break,
            }
        }
        assert!(window.is_complete());
        assert_eq!(window.base(), 4);
    }

    #[test]
    fn attempts_accumulate_per_seq() {
        let mut window = SlidingWindow::new(2, 2);
        window.admit();
        assert_eq!(window.note_attempt(0), 1);
        assert_eq!(window.note_attempt(0), 2);
        assert_eq!(window.attempts(0), 2);
        assert_eq!(window.attempts(1), 0);
    }
}
