//! In-memory collaborators for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::convert::CodecRegistry;
use crate::error::{Error, Result};
use crate::media::{
    AudioCodecData, AudioDecoder, AudioEncoder, AudioFrame, CodecData, CodecType, Demuxer, Muxer,
    Packet, SampleFormat, VideoCodecData,
};

/// Route crate logs to the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn h264() -> CodecData {
    VideoCodecData::new(CodecType::H264, 1280, 720).into()
}

pub fn aac() -> CodecData {
    AudioCodecData::new(CodecType::Aac, 44100, 2).into()
}

/// Speex at 8kHz mono, 160 samples (20ms) per packet
pub fn speex() -> AudioCodecData {
    AudioCodecData::new(CodecType::Speex, 8000, 1).with_frame_samples(160)
}

/// A-law at 8kHz mono; duration follows payload length
pub fn alaw() -> AudioCodecData {
    AudioCodecData::new(CodecType::PcmAlaw, 8000, 1)
}

pub fn video_streams() -> Vec<CodecData> {
    vec![h264()]
}

/// H.264 on stream 0, AAC on stream 1
pub fn video_audio_streams() -> Vec<CodecData> {
    vec![h264(), aac()]
}

pub fn video_key(ms: u64) -> Packet {
    Packet::keyframe(0, Duration::from_millis(ms), Bytes::from_static(&[0x17]))
}

pub fn video(ms: u64) -> Packet {
    Packet::new(0, Duration::from_millis(ms), Bytes::from_static(&[0x27]))
}

pub fn audio(ms: u64) -> Packet {
    Packet::new(1, Duration::from_millis(ms), Bytes::from_static(&[0xAF]))
}

/// Demuxer over a fixed packet list
pub struct VecDemuxer {
    streams: Vec<CodecData>,
    packets: VecDeque<Packet>,
    failure: Option<String>,
    pub streams_calls: usize,
}

impl VecDemuxer {
    pub fn new(streams: Vec<CodecData>, packets: Vec<Packet>) -> Self {
        Self {
            streams,
            packets: packets.into(),
            failure: None,
            streams_calls: 0,
        }
    }

    /// Fail with an I/O error instead of end-of-stream once drained
    pub fn fail_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

impl Demuxer for VecDemuxer {
    async fn streams(&mut self) -> Result<Vec<CodecData>> {
        self.streams_calls += 1;
        Ok(self.streams.clone())
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        if let Some(packet) = self.packets.pop_front() {
            return Ok(packet);
        }
        match &self.failure {
            Some(message) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                message.clone(),
            ))),
            None => Err(Error::EndOfStream),
        }
    }
}

/// Muxer that records everything written to it
#[derive(Debug, Default)]
pub struct VecMuxer {
    pub streams: Option<Vec<CodecData>>,
    pub packets: Vec<Packet>,
    pub trailer_written: bool,
}

impl Muxer for VecMuxer {
    async fn write_header(&mut self, streams: &[CodecData]) -> Result<()> {
        self.streams = Some(streams.to_vec());
        Ok(())
    }

    async fn write_packet(&mut self, packet: Packet) -> Result<()> {
        self.packets.push(packet);
        Ok(())
    }

    async fn write_trailer(&mut self) -> Result<()> {
        self.trailer_written = true;
        Ok(())
    }
}

/// Decoder that yields one frame of `frame_samples` for every
/// `batch` inputs, buffering the rest
pub struct FakeDecoder {
    pub frame_samples: usize,
    pub batch: usize,
    pending: usize,
    pub closed: Arc<AtomicBool>,
}

impl FakeDecoder {
    pub fn new(frame_samples: usize, batch: usize) -> Self {
        Self {
            frame_samples,
            batch,
            pending: 0,
            closed: Default::default(),
        }
    }
}

impl AudioDecoder for FakeDecoder {
    fn decode(&mut self, _data: &[u8]) -> Result<Option<AudioFrame>> {
        self.pending += 1;
        if self.pending < self.batch {
            return Ok(None);
        }
        self.pending = 0;
        let samples = self.frame_samples * self.batch;
        Ok(Some(AudioFrame {
            sample_format: SampleFormat::S16,
            sample_rate: 8000,
            channels: 1,
            sample_count: samples,
            data: vec![Bytes::from(vec![0u8; samples * 2])],
        }))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A-law encoder that emits fixed-size packets of `packet_samples`,
/// carrying leftovers into the next call
pub struct FakeEncoder {
    pub packet_samples: usize,
    buffered: usize,
    codec: AudioCodecData,
    pub closed: Arc<AtomicBool>,
}

impl FakeEncoder {
    pub fn new(packet_samples: usize) -> Self {
        Self {
            packet_samples,
            buffered: 0,
            codec: alaw(),
            closed: Default::default(),
        }
    }

    /// Advertise a different output descriptor
    pub fn with_codec(mut self, codec: AudioCodecData) -> Self {
        self.codec = codec;
        self
    }
}

impl AudioEncoder for FakeEncoder {
    fn codec_data(&self) -> Result<AudioCodecData> {
        Ok(self.codec.clone())
    }

    fn encode(&mut self, frame: &AudioFrame) -> Result<Vec<Bytes>> {
        self.buffered += frame.sample_count;
        let mut out = Vec::new();
        while self.buffered >= self.packet_samples {
            self.buffered -= self.packet_samples;
            out.push(Bytes::from(vec![0xD5u8; self.packet_samples]));
        }
        Ok(out)
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Registry that encodes A-law only
pub struct AlawRegistry {
    pub decoders: bool,
}

impl CodecRegistry for AlawRegistry {
    fn new_audio_encoder(&self, codec: CodecType) -> Option<Box<dyn AudioEncoder>> {
        (codec == CodecType::PcmAlaw).then(|| Box::new(FakeEncoder::new(160)) as Box<dyn AudioEncoder>)
    }

    fn new_audio_decoder(&self, _codec: &AudioCodecData) -> Option<Box<dyn AudioDecoder>> {
        self.decoders
            .then(|| Box::new(FakeDecoder::new(160, 1)) as Box<dyn AudioDecoder>)
    }
}
