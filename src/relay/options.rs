//! Publish and play options from URL query strings

use std::str::FromStr;
use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::filter::{Filters, FixTime, FrameDropper, WaitKeyFrame};
use crate::queue::{CursorStart, QueueConfig};

/// Publisher-side channel options
///
/// Query: `cachegop=N`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Retention target for the channel queue, in GOPs
    pub cache_gop: Option<usize>,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention target
    pub fn cache_gop(mut self, n: usize) -> Self {
        self.cache_gop = Some(n);
        self
    }

    /// Parse from a query string such as `cachegop=1`
    pub fn from_query(query: &str) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in query_pairs(query) {
            if key == "cachegop" {
                options.cache_gop = Some(parse_number(key, value)?);
            }
        }
        Ok(options)
    }

    /// Queue configuration for a new channel
    pub fn queue_config(&self) -> QueueConfig {
        let config = QueueConfig::default();
        match self.cache_gop {
            Some(n) => config.max_gop_count(n),
            None => config,
        }
    }
}

/// Subscriber-side options
///
/// Query: `delaygop=N`, `delaytime=5s`, `waitkey=1`, `framedrop=N`,
/// `delayskip=1s`, `skipinterval=N`. Any non-empty `waitkey` value enables
/// keyframe gating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayOptions {
    /// Start this many GOPs behind live; wins over `delay_time`
    pub delay_gop: Option<usize>,
    /// Start this far behind live
    pub delay_time: Option<Duration>,
    /// Drop everything before the first video keyframe
    pub wait_key: bool,
    /// Drop one non-key video frame every N packets
    pub frame_drop: Option<usize>,
    /// Skip to the next keyframe once lagging by this much
    pub delay_skip: Option<Duration>,
    /// Force a skip every N keyframes (with `delay_skip`)
    pub skip_interval: Option<usize>,
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay_gop(mut self, n: usize) -> Self {
        self.delay_gop = Some(n);
        self
    }

    pub fn delay_time(mut self, delay: Duration) -> Self {
        self.delay_time = Some(delay);
        self
    }

    pub fn wait_key(mut self, enabled: bool) -> Self {
        self.wait_key = enabled;
        self
    }

    pub fn frame_drop(mut self, interval: usize) -> Self {
        self.frame_drop = Some(interval);
        self
    }

    pub fn delay_skip(mut self, threshold: Duration) -> Self {
        self.delay_skip = Some(threshold);
        self
    }

    pub fn skip_interval(mut self, n: usize) -> Self {
        self.skip_interval = Some(n);
        self
    }

    /// Parse from a query string such as `delaytime=10s&waitkey=true`
    pub fn from_query(query: &str) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in query_pairs(query) {
            match key {
                "delaygop" => options.delay_gop = Some(parse_number(key, value)?),
                "delaytime" => options.delay_time = Some(parse_query_duration(key, value)?),
                "waitkey" => options.wait_key = !value.is_empty(),
                "framedrop" => options.frame_drop = Some(parse_number(key, value)?),
                "delayskip" => options.delay_skip = Some(parse_query_duration(key, value)?),
                "skipinterval" => options.skip_interval = Some(parse_number(key, value)?),
                _ => {}
            }
        }
        Ok(options)
    }

    /// Where a new cursor starts
    pub fn cursor_start(&self) -> CursorStart {
        match (self.delay_gop, self.delay_time) {
            (Some(n), _) => CursorStart::DelayedGopCount(n),
            (None, Some(delay)) => CursorStart::DelayedTime(delay),
            (None, None) => CursorStart::Latest,
        }
    }

    /// Filter chain for one subscriber
    pub fn filters(&self) -> Filters {
        let mut filters = Filters::new();

        if self.wait_key {
            filters.push(WaitKeyFrame::new());
        }

        filters.push(FixTime::new().start_from_zero(true).make_increment(true));

        if let Some(interval) = self.frame_drop {
            filters.push(FrameDropper::interval(interval));
        }

        if let Some(threshold) = self.delay_skip {
            filters.push(
                FrameDropper::delay_skip(threshold)
                    .with_skip_interval(self.skip_interval.unwrap_or(0)),
            );
        }

        filters
    }
}

fn query_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

fn invalid(key: &str, value: &str) -> RelayError {
    RelayError::InvalidQuery {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(key, value).into())
}

fn parse_query_duration(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value).ok_or_else(|| invalid(key, value).into())
}

/// Parse a duration like `300ms`, `1.5s` or `1h2m3s`
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is allowed;
/// negative values are not.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() {
        return None;
    }

    let mut rest = s;
    let mut total = 0f64;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return None;
        }
        let value: f64 = rest[..num_len].parse().ok()?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total += value * nanos_per_unit;
    }

    if !total.is_finite() || total > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total.round() as u64))
}
