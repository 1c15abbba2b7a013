//! Demuxed media packets
//!
//! A [`Packet`] is one already-container-decoded access unit. Packets are
//! cheap to clone: the payload is a reference-counted [`Bytes`], so every
//! cursor that reads a packet from a queue shares the same allocation.

use std::time::Duration;

use bytes::Bytes;

/// A time-stamped media packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Index into the session's stream list
    pub stream_index: usize,
    /// Presentation timestamp
    pub time: Duration,
    /// Compressed payload (zero-copy via reference counting)
    pub data: Bytes,
    /// Whether this is a video keyframe
    pub is_keyframe: bool,
}

impl Packet {
    /// Create a non-key packet
    pub fn new(stream_index: usize, time: Duration, data: Bytes) -> Self {
        Self {
            stream_index,
            time,
            data,
            is_keyframe: false,
        }
    }

    /// Create a keyframe packet
    pub fn keyframe(stream_index: usize, time: Duration, data: Bytes) -> Self {
        Self {
            is_keyframe: true,
            ..Self::new(stream_index, time, data)
        }
    }

    /// Return a copy of this packet with a different timestamp
    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_constructors() {
        let pkt = Packet::new(1, Duration::from_millis(40), Bytes::from_static(&[1, 2, 3]));
        assert_eq!(pkt.stream_index, 1);
        assert!(!pkt.is_keyframe);
        assert_eq!(pkt.size(), 3);

        let key = Packet::keyframe(0, Duration::ZERO, Bytes::new());
        assert!(key.is_keyframe);
    }

    #[test]
    fn test_clone_shares_payload() {
        let pkt = Packet::new(0, Duration::ZERO, Bytes::from(vec![0u8; 1024]));
        let copy = pkt.clone().with_time(Duration::from_secs(1));

        assert_eq!(pkt.data.as_ptr(), copy.data.as_ptr());
        assert_eq!(pkt.time, Duration::ZERO);
        assert_eq!(copy.time, Duration::from_secs(1));
    }
}
