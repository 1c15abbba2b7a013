//! Timestamp repair

use std::time::Duration;

use super::{from_nanos, to_nanos, Filter, FilterContext, Verdict};
use crate::error::Result;
use crate::media::Packet;

/// Largest forward step accepted as continuous playback
const MAX_FORWARD_JUMP: Duration = Duration::from_millis(500);

/// Fix incorrect packet timestamps
///
/// - `start_from_zero` rebases every timestamp on the first packet's.
/// - `make_increment` keeps output monotonic: a step backwards, or forwards
///   by more than 500ms, is folded into a running offset and the packet
///   reuses the previous timestamp.
#[derive(Debug, Default)]
pub struct FixTime {
    start_from_zero: bool,
    make_increment: bool,
    zero_base: Option<i128>,
    /// Accumulated discontinuity, in signed nanoseconds
    incr_base: i128,
    last_time: Option<i128>,
}

impl FixTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebase timestamps so the stream starts at zero
    pub fn start_from_zero(mut self, enabled: bool) -> Self {
        self.start_from_zero = enabled;
        self
    }

    /// Force non-decreasing, smooth timestamps
    pub fn make_increment(mut self, enabled: bool) -> Self {
        self.make_increment = enabled;
        self
    }
}

impl Filter for FixTime {
    fn modify_packet(&mut self, packet: &mut Packet, _ctx: &FilterContext<'_>) -> Result<Verdict> {
        let mut time = to_nanos(packet.time);

        if self.start_from_zero {
            time -= *self.zero_base.get_or_insert(time);
        }

        if self.make_increment {
            time -= self.incr_base;
            if let Some(last) = self.last_time {
                if time < last || time > last + to_nanos(MAX_FORWARD_JUMP) {
                    tracing::debug!(
                        jump_ms = ((time - last) / 1_000_000) as i64,
                        "Timestamp discontinuity absorbed"
                    );
                    self.incr_base += time - last;
                    time = last;
                }
            }
            self.last_time = Some(time);
        }

        packet.time = from_nanos(time);
        Ok(Verdict::Keep)
    }
}
