//! Stream descriptors
//!
//! A session's streams are an ordered list of [`CodecData`]; the position in
//! the list is the `stream_index` carried by every [`Packet`](super::Packet).

use std::time::Duration;

use bytes::Bytes;

use super::aac::AudioSpecificConfig;
use crate::error::MediaError;

/// Codec identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecType {
    /// H.264/AVC
    H264,
    /// H.265/HEVC
    H265,
    /// AAC
    Aac,
    /// Speex
    Speex,
    /// Nellymoser
    Nellymoser,
    /// G.711 µ-law
    PcmMulaw,
    /// G.711 A-law
    PcmAlaw,
    /// Signed 16-bit little-endian PCM
    PcmS16le,
    /// Opus
    Opus,
    /// MP3
    Mp3,
}

impl CodecType {
    /// Check if this is a video codec
    pub fn is_video(&self) -> bool {
        matches!(self, CodecType::H264 | CodecType::H265)
    }

    /// Check if this is an audio codec
    pub fn is_audio(&self) -> bool {
        !self.is_video()
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodecType::H264 => "H264",
            CodecType::H265 => "H265",
            CodecType::Aac => "AAC",
            CodecType::Speex => "SPEEX",
            CodecType::Nellymoser => "NELLYMOSER",
            CodecType::PcmMulaw => "PCM_MULAW",
            CodecType::PcmAlaw => "PCM_ALAW",
            CodecType::PcmS16le => "PCM_S16LE",
            CodecType::Opus => "OPUS",
            CodecType::Mp3 => "MP3",
        }
    }
}

impl std::fmt::Display for CodecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Video stream descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCodecData {
    /// Codec
    pub codec_type: CodecType,
    /// Width in pixels (0 if unknown)
    pub width: u32,
    /// Height in pixels (0 if unknown)
    pub height: u32,
    /// Decoder configuration record (e.g. AVCDecoderConfigurationRecord)
    pub record: Bytes,
}

impl VideoCodecData {
    pub fn new(codec_type: CodecType, width: u32, height: u32) -> Self {
        Self {
            codec_type,
            width,
            height,
            record: Bytes::new(),
        }
    }

    /// Set the decoder configuration record
    pub fn with_record(mut self, record: Bytes) -> Self {
        self.record = record;
        self
    }
}

/// Audio stream descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCodecData {
    /// Codec
    pub codec_type: CodecType,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u8,
    /// Samples carried by each compressed packet, for frame-based codecs
    pub frame_samples: Option<u32>,
    /// Codec extradata (AudioSpecificConfig for AAC)
    pub config: Bytes,
}

impl AudioCodecData {
    pub fn new(codec_type: CodecType, sample_rate: u32, channels: u8) -> Self {
        Self {
            codec_type,
            sample_rate,
            channels,
            frame_samples: None,
            config: Bytes::new(),
        }
    }

    /// Build an AAC descriptor from its AudioSpecificConfig
    pub fn aac(config: Bytes) -> Result<Self, MediaError> {
        let asc = AudioSpecificConfig::parse(config)?;
        Ok(Self {
            codec_type: CodecType::Aac,
            sample_rate: asc.sample_rate,
            channels: asc.channels(),
            frame_samples: Some(asc.samples_per_frame()),
            config: asc.raw,
        })
    }

    /// Set the number of samples per compressed packet
    pub fn with_frame_samples(mut self, samples: u32) -> Self {
        self.frame_samples = Some(samples);
        self
    }

    /// Duration of one compressed payload
    ///
    /// PCM codecs derive the duration from the payload length; frame-based
    /// codecs use a fixed number of samples per packet.
    pub fn packet_duration(&self, data: &[u8]) -> Result<Duration, MediaError> {
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(MediaError::InvalidAudioParams);
        }

        let samples = match self.codec_type {
            CodecType::PcmMulaw | CodecType::PcmAlaw => (data.len() / self.channels as usize) as u64,
            CodecType::PcmS16le => (data.len() / (2 * self.channels as usize)) as u64,
            CodecType::Aac => self.frame_samples.unwrap_or(1024) as u64,
            other => self
                .frame_samples
                .ok_or(MediaError::UnknownPacketDuration(other))? as u64,
        };

        Ok(samples_to_duration(samples, self.sample_rate))
    }
}

/// Convert a sample count to a duration at the given rate
pub fn samples_to_duration(samples: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(samples * 1_000_000_000 / sample_rate as u64)
}

/// Stream descriptor, polymorphic over audio and video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecData {
    Video(VideoCodecData),
    Audio(AudioCodecData),
}

impl CodecData {
    pub fn codec_type(&self) -> CodecType {
        match self {
            CodecData::Video(v) => v.codec_type,
            CodecData::Audio(a) => a.codec_type,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, CodecData::Video(_))
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, CodecData::Audio(_))
    }

    /// Get the audio descriptor, if this is an audio stream
    pub fn as_audio(&self) -> Option<&AudioCodecData> {
        match self {
            CodecData::Audio(a) => Some(a),
            CodecData::Video(_) => None,
        }
    }
}

impl From<VideoCodecData> for CodecData {
    fn from(v: VideoCodecData) -> Self {
        CodecData::Video(v)
    }
}

impl From<AudioCodecData> for CodecData {
    fn from(a: AudioCodecData) -> Self {
        CodecData::Audio(a)
    }
}

/// Index of the last video stream and the last audio stream in a list
pub fn stream_indices(streams: &[CodecData]) -> (Option<usize>, Option<usize>) {
    let mut video = None;
    let mut audio = None;
    for (i, stream) in streams.iter().enumerate() {
        match stream {
            CodecData::Video(_) => video = Some(i),
            CodecData::Audio(_) => audio = Some(i),
        }
    }
    (video, audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_type_kind() {
        assert!(CodecType::H264.is_video());
        assert!(!CodecType::H264.is_audio());
        assert!(CodecType::Aac.is_audio());
        assert_eq!(CodecType::PcmMulaw.to_string(), "PCM_MULAW");
    }

    #[test]
    fn test_aac_packet_duration() {
        let aac = AudioCodecData::aac(Bytes::from_static(&[0x11, 0x90])).unwrap();
        assert_eq!(aac.sample_rate, 48000);
        assert_eq!(aac.channels, 2);

        let dur = aac.packet_duration(&[0u8; 300]).unwrap();
        // 1024 samples at 48kHz
        assert_eq!(dur, Duration::from_nanos(21_333_333));
    }

    #[test]
    fn test_pcm_packet_duration() {
        let mulaw = AudioCodecData::new(CodecType::PcmMulaw, 8000, 1);
        assert_eq!(
            mulaw.packet_duration(&[0u8; 160]).unwrap(),
            Duration::from_millis(20)
        );

        let s16 = AudioCodecData::new(CodecType::PcmS16le, 8000, 2);
        assert_eq!(
            s16.packet_duration(&[0u8; 320]).unwrap(),
            Duration::from_millis(10)
        );

        assert_eq!(mulaw.packet_duration(&[]).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_frame_based_packet_duration() {
        let speex = AudioCodecData::new(CodecType::Speex, 16000, 1).with_frame_samples(320);
        assert_eq!(
            speex.packet_duration(&[0u8; 42]).unwrap(),
            Duration::from_millis(20)
        );

        let unknown = AudioCodecData::new(CodecType::Nellymoser, 16000, 1);
        assert_eq!(
            unknown.packet_duration(&[0u8; 64]),
            Err(MediaError::UnknownPacketDuration(CodecType::Nellymoser))
        );
    }

    #[test]
    fn test_packet_duration_invalid_params() {
        let bad = AudioCodecData::new(CodecType::PcmAlaw, 8000, 0);
        assert_eq!(
            bad.packet_duration(&[0u8; 8]),
            Err(MediaError::InvalidAudioParams)
        );
    }

    #[test]
    fn test_stream_indices() {
        let streams = vec![
            CodecData::from(VideoCodecData::new(CodecType::H264, 1280, 720)),
            CodecData::from(AudioCodecData::new(CodecType::Aac, 44100, 2)),
        ];
        assert_eq!(stream_indices(&streams), (Some(0), Some(1)));
        assert_eq!(stream_indices(&[]), (None, None));
        assert_eq!(streams[1].codec_type(), CodecType::Aac);
        assert!(streams[0].as_audio().is_none());
    }
}
