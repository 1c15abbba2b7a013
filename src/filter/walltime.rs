//! Real-time pacing

use tokio::time::Instant;

use super::{Filter, FilterContext, Verdict};
use crate::error::Result;
use crate::media::Packet;

/// Hold packets back until their timestamp has elapsed in wall-clock time
///
/// Only stream 0 is paced. Its first packet anchors the origin; every later
/// packet on that stream is delayed until `origin + packet.time`. Packets
/// are never dropped.
#[derive(Debug, Default)]
pub struct Walltime {
    origin: Option<Instant>,
}

impl Walltime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for Walltime {
    fn modify_packet(&mut self, packet: &mut Packet, _ctx: &FilterContext<'_>) -> Result<Verdict> {
        if packet.stream_index != 0 {
            return Ok(Verdict::Keep);
        }

        let now = Instant::now();
        let origin = *self.origin.get_or_insert(now);
        let deadline = origin + packet.time;

        Ok(if deadline > now {
            Verdict::Delay(deadline)
        } else {
            Verdict::Keep
        })
    }
}
