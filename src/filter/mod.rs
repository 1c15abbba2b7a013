//! Packet filters
//!
//! A [`Filter`] looks at one packet at a time and may rewrite its timestamp,
//! drop it, or ask for it to be held back until a wall-clock deadline.
//! Filters are chained with [`Filters`] and applied to a packet source by
//! [`FilterDemuxer`].
//!
//! Filters keep per-stream state and are not shared: every packet path (one
//! cursor, one conversion) owns its own chain.

pub mod av_sync;
pub mod demuxer;
pub mod fix_time;
pub mod frame_dropper;
pub mod wait_keyframe;
pub mod walltime;

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::media::{CodecData, Packet};

pub use av_sync::AvSync;
pub use demuxer::FilterDemuxer;
pub use fix_time::FixTime;
pub use frame_dropper::FrameDropper;
pub use wait_keyframe::WaitKeyFrame;
pub use walltime::Walltime;

/// Outcome of running a filter on a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Pass the (possibly modified) packet on
    Keep,
    /// Discard the packet
    Drop,
    /// Pass the packet on, but not before this instant
    Delay(Instant),
}

/// Stream layout a filter sees alongside each packet
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Stream descriptors of the source
    pub streams: &'a [CodecData],
    /// Index of the video stream, if any
    pub video_index: Option<usize>,
    /// Index of the audio stream, if any
    pub audio_index: Option<usize>,
}

impl FilterContext<'_> {
    /// Check if a packet belongs to the video stream
    pub fn is_video(&self, packet: &Packet) -> bool {
        Some(packet.stream_index) == self.video_index
    }
}

/// Per-packet transform
pub trait Filter: Send {
    /// Inspect and possibly modify a packet
    fn modify_packet(&mut self, packet: &mut Packet, ctx: &FilterContext<'_>) -> Result<Verdict>;
}

/// Ordered filter chain
///
/// Filters run in insertion order. The first `Drop` or error stops the
/// chain; a `Delay` is waited out before the next filter runs.
#[derive(Default)]
pub struct Filters {
    filters: Vec<Box<dyn Filter>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter
    pub fn push<F: Filter + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    /// Append a filter, builder style
    pub fn with<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain; returns `false` if the packet was dropped
    pub async fn apply(&mut self, packet: &mut Packet, ctx: &FilterContext<'_>) -> Result<bool> {
        for filter in &mut self.filters {
            match filter.modify_packet(packet, ctx)? {
                Verdict::Keep => {}
                Verdict::Drop => return Ok(false),
                Verdict::Delay(deadline) => tokio::time::sleep_until(deadline).await,
            }
        }
        Ok(true)
    }
}

/// Signed nanoseconds of a duration
pub(crate) fn to_nanos(d: Duration) -> i128 {
    d.as_nanos() as i128
}

/// Duration from signed nanoseconds, clamped at zero
pub(crate) fn from_nanos(n: i128) -> Duration {
    if n <= 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(n.min(u64::MAX as i128) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{video, video_audio_streams};

    struct Shift(Duration);

    impl Filter for Shift {
        fn modify_packet(&mut self, packet: &mut Packet, _: &FilterContext<'_>) -> Result<Verdict> {
            packet.time += self.0;
            Ok(Verdict::Keep)
        }
    }

    struct DropAll;

    impl Filter for DropAll {
        fn modify_packet(&mut self, _: &mut Packet, _: &FilterContext<'_>) -> Result<Verdict> {
            Ok(Verdict::Drop)
        }
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let streams = video_audio_streams();
        let ctx = FilterContext {
            streams: &streams,
            video_index: Some(0),
            audio_index: Some(1),
        };
        let mut filters = Filters::new()
            .with(Shift(Duration::from_millis(10)))
            .with(Shift(Duration::from_millis(5)));
        assert_eq!(filters.len(), 2);

        let mut packet = video(0);
        assert!(filters.apply(&mut packet, &ctx).await.unwrap());
        assert_eq!(packet.time, Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_chain_short_circuits_on_drop() {
        let streams = video_audio_streams();
        let ctx = FilterContext {
            streams: &streams,
            video_index: Some(0),
            audio_index: Some(1),
        };
        let mut filters = Filters::new()
            .with(DropAll)
            .with(Shift(Duration::from_millis(10)));

        let mut packet = video(0);
        assert!(!filters.apply(&mut packet, &ctx).await.unwrap());
        assert_eq!(packet.time, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_empty_chain_keeps_everything() {
        let mut filters = Filters::new();
        assert!(filters.is_empty());

        let ctx = FilterContext {
            streams: &[],
            video_index: None,
            audio_index: None,
        };
        let mut packet = video(7);
        assert!(filters.apply(&mut packet, &ctx).await.unwrap());
    }

    #[test]
    fn test_nanos_helpers() {
        assert_eq!(from_nanos(-5), Duration::ZERO);
        assert_eq!(from_nanos(to_nanos(Duration::from_millis(3))), Duration::from_millis(3));
    }
}
