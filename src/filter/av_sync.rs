//! Audio/video sync enforcement

use std::time::Duration;

use super::{Filter, FilterContext, Verdict};
use crate::error::{Error, Result};
use crate::media::Packet;

/// Default window width above the slowest stream
pub const DEFAULT_MAX_TIME_DIFF: Duration = Duration::from_millis(500);

/// Timestamp assigned to a corrected packet, relative to the slowest stream.
/// Inherited constant with no documented derivation; kept for compatibility.
pub const CORRECTION_OFFSET: Duration = Duration::from_millis(40);

/// Drop or rewrite packets that drift too far from the other streams
///
/// Each stream's last accepted timestamp is tracked. A packet is accepted
/// unchanged if it lies in `[start, start + max_time_diff)`, where `start`
/// is the smallest tracked timestamp. Otherwise it is rewritten to
/// `start + 40ms` and every stream is reset to that time, unless it belongs
/// to the stream that is furthest ahead while the streams disagree; that
/// packet is dropped instead.
#[derive(Debug)]
pub struct AvSync {
    max_time_diff: Duration,
    times: Vec<Duration>,
}

struct Window {
    start: Duration,
    end: Duration,
    correctable: bool,
}

impl AvSync {
    pub fn new() -> Self {
        Self {
            max_time_diff: DEFAULT_MAX_TIME_DIFF,
            times: Vec::new(),
        }
    }

    /// Set the accepted distance above the slowest stream
    pub fn with_max_time_diff(mut self, diff: Duration) -> Self {
        self.max_time_diff = diff;
        self
    }

    /// Last accepted timestamp per stream
    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    fn window(&self, index: usize) -> Window {
        let mut min_idx = 0;
        let mut max_idx = 0;
        for (i, time) in self.times.iter().enumerate() {
            if *time < self.times[min_idx] {
                min_idx = i;
            }
            if *time > self.times[max_idx] {
                max_idx = i;
            }
        }

        let all_same = self.times[min_idx] == self.times[max_idx];
        let start = self.times[min_idx];

        Window {
            start,
            end: start + self.max_time_diff,
            correctable: index != max_idx || all_same,
        }
    }
}

impl Default for AvSync {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for AvSync {
    fn modify_packet(&mut self, packet: &mut Packet, ctx: &FilterContext<'_>) -> Result<Verdict> {
        if self.times.is_empty() {
            self.times = vec![Duration::ZERO; ctx.streams.len()];
        }

        let index = packet.stream_index;
        if index >= self.times.len() {
            return Err(Error::InvalidStreamIndex(index));
        }

        let window = self.window(index);
        if packet.time >= window.start && packet.time < window.end {
            self.times[index] = packet.time;
            return Ok(Verdict::Keep);
        }

        if !window.correctable {
            tracing::debug!(
                stream = index,
                time_ms = packet.time.as_millis() as u64,
                "Leading stream out of sync, dropping packet"
            );
            return Ok(Verdict::Drop);
        }

        let corrected = window.start + CORRECTION_OFFSET;
        tracing::debug!(
            stream = index,
            time_ms = packet.time.as_millis() as u64,
            corrected_ms = corrected.as_millis() as u64,
            "Packet out of sync, correcting timestamp"
        );
        packet.time = corrected;
        self.times.fill(corrected);
        Ok(Verdict::Keep)
    }
}
