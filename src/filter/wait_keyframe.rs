//! Keyframe gate for new subscribers

use super::{Filter, FilterContext, Verdict};
use crate::error::Result;
use crate::media::Packet;

/// Drop every packet until the first video keyframe
///
/// Audio packets that arrive before the keyframe are dropped too, so a
/// subscriber never starts in the middle of a GOP.
#[derive(Debug, Default)]
pub struct WaitKeyFrame {
    ok: bool,
}

impl WaitKeyFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the first keyframe was seen
    pub fn is_open(&self) -> bool {
        self.ok
    }
}

impl Filter for WaitKeyFrame {
    fn modify_packet(&mut self, packet: &mut Packet, ctx: &FilterContext<'_>) -> Result<Verdict> {
        if !self.ok && packet.is_keyframe && ctx.is_video(packet) {
            self.ok = true;
        }
        Ok(if self.ok { Verdict::Keep } else { Verdict::Drop })
    }
}
