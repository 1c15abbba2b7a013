//! AAC AudioSpecificConfig parsing
//!
//! The AudioSpecificConfig travels as codec extradata. Only the fields
//! that fix the duration of a raw AAC frame are decoded: sample rate,
//! channel layout and frame length.
//!
//! ```text
//! +-----------------+------------------------+---------------+-------------+
//! | audioObjectType | samplingFrequencyIndex | channelConfig | frameLength |
//! | 5 bits (+6)     | 4 bits (+24 if 0xF)    | 4 bits        | 1 bit       |
//! +-----------------+------------------------+---------------+-------------+
//! ```

use bytes::Bytes;

use crate::error::MediaError;

const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

const EXPLICIT_RATE: u8 = 0x0F;
const ESCAPE_OBJECT_TYPE: u8 = 31;

/// MSB-first bit reader over a byte slice
struct Bits<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Bits<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read(&mut self, n: usize) -> Result<u32, MediaError> {
        if self.pos + n > self.data.len() * 8 {
            return Err(MediaError::InvalidAacConfig);
        }
        let mut value = 0u32;
        for _ in 0..n {
            let bit = (self.data[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.pos += 1;
        }
        Ok(value)
    }
}

/// Decoded AudioSpecificConfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    /// Audio object type; 2 is AAC LC, 5 is HE-AAC
    pub object_type: u8,
    pub sample_rate: u32,
    /// Channel configuration; 0 means defined in the bitstream
    pub channel_config: u8,
    /// Frames carry 960 rather than 1024 samples
    pub short_frames: bool,
    /// Undecoded extradata
    pub raw: Bytes,
}

impl AudioSpecificConfig {
    /// Parse from codec extradata
    pub fn parse(data: Bytes) -> Result<Self, MediaError> {
        let mut bits = Bits::new(&data);

        let mut object_type = bits.read(5)? as u8;
        if object_type == ESCAPE_OBJECT_TYPE {
            object_type = 32 + bits.read(6)? as u8;
        }

        let rate_index = bits.read(4)? as u8;
        let sample_rate = if rate_index == EXPLICIT_RATE {
            bits.read(24)?
        } else {
            *SAMPLE_RATES
                .get(rate_index as usize)
                .ok_or(MediaError::InvalidAacConfig)?
        };
        if sample_rate == 0 {
            return Err(MediaError::InvalidAacConfig);
        }

        let channel_config = bits.read(4)? as u8;
        let short_frames = bits.read(1)? == 1;

        Ok(Self {
            object_type,
            sample_rate,
            channel_config,
            short_frames,
            raw: data,
        })
    }

    /// Number of output channels
    pub fn channels(&self) -> u8 {
        match self.channel_config {
            7 => 8,
            n @ 1..=6 => n,
            _ => 0,
        }
    }

    /// Samples in one raw AAC frame
    pub fn samples_per_frame(&self) -> u32 {
        if self.short_frames {
            960
        } else {
            1024
        }
    }
}
