//! Per-stream audio transcoding

use std::fmt;

use crate::error::{Direction, Error, Result, TranscodeError};
use crate::media::{AudioCodecData, AudioDecoder, AudioEncoder, CodecData, Packet};

use super::timeline::Timeline;

/// Decoder and encoder for one transcoded stream
pub struct AudioCodecPair {
    pub decoder: Box<dyn AudioDecoder>,
    pub encoder: Box<dyn AudioEncoder>,
}

impl AudioCodecPair {
    pub fn new<D, E>(decoder: D, encoder: E) -> Self
    where
        D: AudioDecoder + 'static,
        E: AudioEncoder + 'static,
    {
        Self {
            decoder: Box::new(decoder),
            encoder: Box::new(encoder),
        }
    }
}

/// Decide, per audio stream, whether to transcode and with what
///
/// Returning `Ok(None)` leaves the stream untouched.
pub trait AudioCodecFinder: Send {
    fn find(&mut self, codec: &AudioCodecData, index: usize) -> Result<Option<AudioCodecPair>>;
}

impl<F> AudioCodecFinder for F
where
    F: FnMut(&AudioCodecData, usize) -> Result<Option<AudioCodecPair>> + Send,
{
    fn find(&mut self, codec: &AudioCodecData, index: usize) -> Result<Option<AudioCodecPair>> {
        self(codec, index)
    }
}

/// Transcoder configuration
#[derive(Default)]
pub struct TranscodeOptions {
    /// Codec lookup; without one every stream passes through
    pub finder: Option<Box<dyn AudioCodecFinder>>,
}

impl TranscodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the codec lookup
    pub fn finder<F: AudioCodecFinder + 'static>(mut self, finder: F) -> Self {
        self.finder = Some(Box::new(finder));
        self
    }
}

impl fmt::Debug for TranscodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeOptions")
            .field("finder", &self.finder.is_some())
            .finish()
    }
}

struct AudioTranscode {
    input: AudioCodecData,
    output: AudioCodecData,
    timeline: Timeline,
    decoder: Box<dyn AudioDecoder>,
    encoder: Box<dyn AudioEncoder>,
}

impl AudioTranscode {
    fn run(&mut self, packet: Packet) -> Result<Vec<Packet>> {
        let index = packet.stream_index;
        let decoded = self
            .decoder
            .decode(&packet.data)
            .map_err(|e| codec_failure(index, e))?;
        let Some(frame) = decoded else {
            return Ok(Vec::new());
        };

        let duration = self.input.packet_duration(&packet.data).map_err(|source| {
            TranscodeError::PacketDuration {
                stream: index,
                direction: Direction::Input,
                source,
            }
        })?;

        tracing::trace!(
            stream = index,
            time_ms = packet.time.as_millis() as u64,
            duration_ms = duration.as_millis() as u64,
            "Timeline push"
        );
        self.timeline.push(packet.time, duration);

        let payloads = self
            .encoder
            .encode(&frame)
            .map_err(|e| codec_failure(index, e))?;
        let mut out = Vec::with_capacity(payloads.len());
        for data in payloads {
            let duration = self.output.packet_duration(&data).map_err(|source| {
                TranscodeError::PacketDuration {
                    stream: index,
                    direction: Direction::Output,
                    source,
                }
            })?;
            let time = self.timeline.pop(duration);

            tracing::trace!(
                stream = index,
                time_ms = time.as_millis() as u64,
                duration_ms = duration.as_millis() as u64,
                "Timeline pop"
            );
            out.push(Packet::new(index, time, data));
        }

        Ok(out)
    }

    fn close(&mut self) {
        self.decoder.close();
        self.encoder.close();
    }
}

fn codec_failure(stream: usize, err: Error) -> TranscodeError {
    TranscodeError::Codec {
        stream,
        message: err.to_string(),
    }
}

struct StreamState {
    codec: CodecData,
    audio: Option<AudioTranscode>,
}

/// Re-encodes selected audio streams packet by packet
///
/// Streams without a codec pair pass through unchanged. For transcoded
/// streams, one input packet may produce zero, one or many output packets;
/// their timestamps come from a [`Timeline`] fed with the input timing.
///
/// Codecs are closed by [`close`](Self::close) or on drop.
pub struct Transcoder {
    streams: Vec<StreamState>,
}

impl Transcoder {
    /// Negotiate codecs for every stream
    pub fn new(streams: &[CodecData], options: &mut TranscodeOptions) -> Result<Self> {
        let mut states = Vec::with_capacity(streams.len());

        for (index, stream) in streams.iter().enumerate() {
            let mut state = StreamState {
                codec: stream.clone(),
                audio: None,
            };

            if let (CodecData::Audio(input), Some(finder)) = (stream, options.finder.as_mut()) {
                if let Some(pair) = finder.find(input, index)? {
                    let output = pair.encoder.codec_data()?;
                    tracing::info!(
                        stream = index,
                        from = %input.codec_type,
                        to = %output.codec_type,
                        "Transcoding audio stream"
                    );
                    state.codec = CodecData::Audio(output.clone());
                    state.audio = Some(AudioTranscode {
                        input: input.clone(),
                        output,
                        timeline: Timeline::new(),
                        decoder: pair.decoder,
                        encoder: pair.encoder,
                    });
                }
            }

            states.push(state);
        }

        Ok(Self { streams: states })
    }

    /// Stream descriptors after transcoding
    pub fn streams(&self) -> Vec<CodecData> {
        self.streams.iter().map(|s| s.codec.clone()).collect()
    }

    /// Check if a stream is being re-encoded
    pub fn is_transcoding(&self, index: usize) -> bool {
        self.streams
            .get(index)
            .is_some_and(|s| s.audio.is_some())
    }

    /// Run one packet through its stream
    pub fn transcode(&mut self, packet: Packet) -> Result<Vec<Packet>> {
        let index = packet.stream_index;
        let stream = self
            .streams
            .get_mut(index)
            .ok_or(Error::InvalidStreamIndex(index))?;

        match stream.audio.as_mut() {
            Some(audio) => audio.run(packet),
            None => Ok(vec![packet]),
        }
    }

    /// Close every codec; later packets are rejected
    pub fn close(&mut self) {
        for stream in self.streams.drain(..) {
            if let Some(mut audio) = stream.audio {
                audio.close();
            }
        }
    }
}

impl Drop for Transcoder {
    fn drop(&mut self) {
        self.close();
    }
}
