//! Packet ring buffer
//!
//! Packets are addressed by an unbounded position counter. `head` is the
//! oldest valid position and `tail` is one past the newest; positions are
//! never reused, so comparing two positions is a plain integer comparison
//! regardless of how much was evicted in between.
//!
//! ```text
//!        time
//!  ----------------->
//!
//!  V-A-V-V-A-V-V-A-V-V
//!  |                 |
//!  head             tail
//!  oldest          latest
//! ```

use std::collections::VecDeque;

use crate::media::Packet;

/// Absolute position in a [`PacketBuf`]
///
/// Signed so that "one before head" is representable while walking
/// backwards from the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufPos(pub i64);

impl BufPos {
    pub fn next(self) -> Self {
        BufPos(self.0 + 1)
    }

    pub fn prev(self) -> Self {
        BufPos(self.0 - 1)
    }
}

/// Append-at-tail, evict-at-head packet store
#[derive(Debug, Default)]
pub struct PacketBuf {
    packets: VecDeque<Packet>,
    head: i64,
}

impl PacketBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest valid position
    pub fn head(&self) -> BufPos {
        BufPos(self.head)
    }

    /// One past the newest position
    pub fn tail(&self) -> BufPos {
        BufPos(self.head + self.packets.len() as i64)
    }

    /// Number of buffered packets
    pub fn count(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Append a packet at the tail
    pub fn push(&mut self, packet: Packet) {
        self.packets.push_back(packet);
    }

    /// Remove and return the packet at the head
    pub fn pop(&mut self) -> Option<Packet> {
        let packet = self.packets.pop_front()?;
        self.head += 1;
        Some(packet)
    }

    /// Check if `head <= pos < tail`
    pub fn is_valid_pos(&self, pos: BufPos) -> bool {
        pos >= self.head() && pos < self.tail()
    }

    /// Get the packet at a valid position
    pub fn get(&self, pos: BufPos) -> Option<&Packet> {
        if !self.is_valid_pos(pos) {
            return None;
        }
        self.packets.get((pos.0 - self.head) as usize)
    }

    /// Clamp a position into `[head, tail]`
    pub fn clamp(&self, pos: BufPos) -> BufPos {
        pos.clamp(self.head(), self.tail())
    }

    /// Iterate over buffered packets, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.packets.iter()
    }
}
