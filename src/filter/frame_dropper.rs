//! Video frame dropping for slow subscribers

use std::time::Duration;

use tokio::time::Instant;

use super::{to_nanos, Filter, FilterContext, Verdict};
use crate::error::Result;
use crate::media::Packet;

/// Drop video frames to thin out or catch up a stream
///
/// Two independent modes, usually configured on separate instances:
///
/// - `interval`: after every `interval` packets, the next non-key video
///   packet is dropped.
/// - `delay_skip`: the gap between wall-clock arrival and packet time is
///   accumulated on the video stream. Once the lag exceeds the threshold
///   the rest of the current GOP is dropped, up to the next keyframe.
///   `skip_interval` additionally forces such a skip every N keyframes.
#[derive(Debug, Default)]
pub struct FrameDropper {
    interval: usize,
    interval_count: usize,
    delay_skip: Option<Duration>,
    skip_interval: usize,
    keyframe_count: usize,
    skipping: bool,
    last_arrival: Option<Instant>,
    last_packet_time: Duration,
    /// Accumulated lag, in signed nanoseconds
    lag: i128,
}

impl FrameDropper {
    /// Drop one non-key video packet every `interval` packets
    pub fn interval(interval: usize) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Skip to the next keyframe once the subscriber lags by `threshold`
    pub fn delay_skip(threshold: Duration) -> Self {
        Self {
            delay_skip: Some(threshold).filter(|d| !d.is_zero()),
            ..Default::default()
        }
    }

    /// Also force a skip every `n` keyframes (delay-skip mode only)
    pub fn with_skip_interval(mut self, n: usize) -> Self {
        self.skip_interval = n;
        self
    }

    /// Check if video is currently being dropped until a keyframe
    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    fn track_delay(&mut self, packet: &Packet, threshold: Duration) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_arrival {
            let real_diff = to_nanos(now.duration_since(last));
            let packet_diff = to_nanos(packet.time) - to_nanos(self.last_packet_time);
            self.lag += real_diff - packet_diff;
        }
        self.last_arrival = Some(now);
        self.last_packet_time = packet.time;

        if !self.skipping {
            if self.lag > to_nanos(threshold) {
                tracing::debug!(
                    lag_ms = (self.lag / 1_000_000) as i64,
                    "Subscriber lagging, skipping to next keyframe"
                );
                self.skipping = true;
                self.lag = 0;
            }
        } else if packet.is_keyframe {
            self.skipping = false;
        }
        let drop = self.skipping;

        if self.skip_interval != 0 && packet.is_keyframe {
            if self.keyframe_count == self.skip_interval {
                self.keyframe_count = 0;
                self.skipping = true;
            }
            self.keyframe_count += 1;
        }

        drop
    }
}

impl Filter for FrameDropper {
    fn modify_packet(&mut self, packet: &mut Packet, ctx: &FilterContext<'_>) -> Result<Verdict> {
        let is_video = ctx.is_video(packet);
        let mut drop = false;

        if let Some(threshold) = self.delay_skip {
            if is_video {
                drop = self.track_delay(packet, threshold);
            }
        }

        if self.interval != 0 {
            if self.interval_count >= self.interval && is_video && !packet.is_keyframe {
                drop = true;
                self.interval_count = 0;
            }
            self.interval_count += 1;
        }

        Ok(if drop { Verdict::Drop } else { Verdict::Keep })
    }
}
