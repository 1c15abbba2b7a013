//! Decoded audio frames
//!
//! Produced by an [`AudioDecoder`](super::AudioDecoder) and consumed by an
//! [`AudioEncoder`](super::AudioEncoder). The crate never inspects samples;
//! it only needs the sample count and rate to reason about durations.

use std::time::Duration;

use bytes::Bytes;

use super::codec::samples_to_duration;

/// Sample storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    S16,
    S32,
    F32,
    F64,
    /// Planar signed 16-bit
    S16P,
    /// Planar 32-bit float
    F32P,
}

impl SampleFormat {
    /// Size of one sample of one channel in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16 | SampleFormat::S16P => 2,
            SampleFormat::S32 | SampleFormat::F32 | SampleFormat::F32P => 4,
            SampleFormat::F64 => 8,
        }
    }

    /// Check if each channel lives in its own plane
    pub fn is_planar(&self) -> bool {
        matches!(self, SampleFormat::S16P | SampleFormat::F32P)
    }
}

/// A block of decoded audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Sample format
    pub sample_format: SampleFormat,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u8,
    /// Samples per channel
    pub sample_count: usize,
    /// One plane per channel for planar formats, otherwise a single plane
    pub data: Vec<Bytes>,
}

impl AudioFrame {
    /// Playback duration of this frame
    pub fn duration(&self) -> Duration {
        samples_to_duration(self.sample_count as u64, self.sample_rate)
    }

    /// Keep the first `n` samples
    pub fn truncate(&mut self, n: usize) {
        if n >= self.sample_count {
            return;
        }
        let per_plane = if self.sample_format.is_planar() {
            self.sample_format.bytes_per_sample()
        } else {
            self.sample_format.bytes_per_sample() * self.channels as usize
        };
        for plane in &mut self.data {
            plane.truncate(n * per_plane);
        }
        self.sample_count = n;
    }
}
