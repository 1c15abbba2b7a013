//! Input-to-output timestamp mapping
//!
//! ```text
//! pop                                   push
//!
//!      seg                 seg        seg
//!   |--------|         |---------|   |---|
//!      20ms                40ms       5ms
//! ----------------- time -------------------->
//! head                                  tail
//! ```

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: Duration,
    duration: Duration,
}

impl Segment {
    fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Maps produced output durations back onto captured input time
///
/// Decoded input is pushed as `(start, duration)` segments; encoded output
/// pops its own duration and receives the input time it corresponds to.
/// Framing on the two sides does not need to line up.
#[derive(Debug, Default)]
pub struct Timeline {
    segments: VecDeque<Segment>,
    head: Duration,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decoded segment
    ///
    /// A segment that would start before the previous one ends, or before
    /// the already consumed watermark, is shifted forward so segments never
    /// overlap and popped times never go backwards.
    pub fn push(&mut self, start: Duration, duration: Duration) {
        let floor = match self.segments.back() {
            Some(tail) => tail.end(),
            None => self.head,
        };
        let start = start.max(floor);
        self.segments.push_back(Segment { start, duration });
    }

    /// Consume `duration` from the front and return where it began
    ///
    /// Once drained, the end of the last consumed segment is returned.
    pub fn pop(&mut self, mut duration: Duration) -> Duration {
        let Some(first) = self.segments.front() else {
            return self.head;
        };
        let start = first.start;

        while !duration.is_zero() {
            let Some(seg) = self.segments.front_mut() else {
                break;
            };
            let step = duration.min(seg.duration);
            seg.duration -= step;
            seg.start += step;
            duration -= step;
            self.head = seg.start;
            if seg.duration.is_zero() {
                self.segments.pop_front();
            }
        }

        start
    }

    /// Number of buffered segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total buffered, not yet popped, duration
    pub fn buffered(&self) -> Duration {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_non_overlapping_segments_drain() {
        let mut tl = Timeline::new();
        tl.push(ms(0), ms(20));
        tl.push(ms(30), ms(40));

        assert_eq!(tl.pop(ms(60)), ms(0));
        assert!(tl.is_empty());
    }

    #[test]
    fn test_overlapping_push_is_shifted() {
        let mut tl = Timeline::new();
        tl.push(ms(100), ms(40));
        tl.push(ms(120), ms(40));

        assert_eq!(tl.pop(ms(40)), ms(100));
        assert_eq!(tl.pop(ms(40)), ms(140));
        assert!(tl.is_empty());
    }

    #[test]
    fn test_pop_smaller_than_segment() {
        let mut tl = Timeline::new();
        tl.push(ms(1000), ms(64));

        // 20ms output frames out of one 64ms input frame
        assert_eq!(tl.pop(ms(20)), ms(1000));
        assert_eq!(tl.pop(ms(20)), ms(1020));
        assert_eq!(tl.pop(ms(20)), ms(1040));
        assert_eq!(tl.buffered(), ms(4));
        assert_eq!(tl.pop(ms(20)), ms(1060));
        assert!(tl.is_empty());
    }

    #[test]
    fn test_pop_spanning_segments() {
        let mut tl = Timeline::new();
        tl.push(ms(0), ms(20));
        tl.push(ms(500), ms(20));
        tl.push(ms(520), ms(20));

        assert_eq!(tl.pop(ms(30)), ms(0));
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.pop(ms(30)), ms(510));
        assert!(tl.is_empty());
    }

    #[test]
    fn test_drained_pop_returns_watermark() {
        let mut tl = Timeline::new();
        assert_eq!(tl.pop(ms(20)), Duration::ZERO);

        tl.push(ms(200), ms(20));
        assert_eq!(tl.pop(ms(50)), ms(200));
        // Drained: stays at the end of the consumed segment
        assert_eq!(tl.pop(ms(20)), ms(220));
        assert_eq!(tl.pop(ms(20)), ms(220));
    }

    #[test]
    fn test_push_behind_watermark_is_shifted() {
        let mut tl = Timeline::new();
        tl.push(ms(1000), ms(20));
        assert_eq!(tl.pop(ms(40)), ms(1000));
        assert_eq!(tl.pop(ms(20)), ms(1020));

        tl.push(ms(1010), ms(20));
        assert_eq!(tl.pop(ms(20)), ms(1020));
    }

    #[test]
    fn test_pops_never_go_backwards() {
        let mut tl = Timeline::new();
        let mut popped = Vec::new();
        for start in [1000, 1040, 1080] {
            tl.push(ms(start), ms(20));
            popped.push(tl.pop(ms(20)));
            popped.push(tl.pop(ms(20)));
        }

        assert_eq!(
            popped,
            vec![ms(1000), ms(1020), ms(1040), ms(1060), ms(1080), ms(1100)]
        );
    }
}
