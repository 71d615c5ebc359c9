use bytes::Bytes;

/// A single numbered frame. Immutable once built; a retransmission
/// constructs a fresh `Frame` carrying the same sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u32,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(seq: u32, payload: Bytes) -> Self {
        Self { seq, payload }
    }

    /// The payload a simulated sender attaches to frame `seq`.
    pub fn simulated(seq: u32) -> Self {
        Self {
            seq,
            payload: Bytes::from(format!("frame-{seq}").into_bytes()),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_payload_names_the_frame() {
        let frame = Frame::simulated(3);
        assert_eq!(frame.seq, 3);
        assert_eq!(&frame.payload[..], b"frame-3");
        assert!(!frame.is_empty());
    }

    #[test]
    fn retransmission_is_a_fresh_frame_with_the_same_seq() {
        let first = Frame::simulated(1);
        let again = Frame::new(1, first.payload.clone());
        assert_eq!(first, again);
    }
}
