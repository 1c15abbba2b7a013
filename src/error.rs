//! Error types
//!
//! One top-level [`Error`] with a sub-enum per concern. End-of-stream is
//! modelled as [`Error::EndOfStream`] so that every producer shares one
//! return type; use [`Error::is_end_of_stream`] to tell normal completion
//! apart from real failures.

use crate::media::CodecType;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate error type
#[derive(Debug)]
pub enum Error {
    /// Graceful end of a packet stream
    EndOfStream,
    /// I/O failure reported by a producer or consumer
    Io(std::io::Error),
    /// Media payload or codec configuration error
    Media(MediaError),
    /// Transcoding error
    Transcode(TranscodeError),
    /// Relay channel error
    Relay(RelayError),
    /// Packet refers to a stream that does not exist
    InvalidStreamIndex(usize),
    /// Invalid conversion arguments
    InvalidArgs(String),
}

impl Error {
    /// Check if this is the end-of-stream sentinel
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EndOfStream => write!(f, "End of stream"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Media(e) => write!(f, "Media error: {}", e),
            Error::Transcode(e) => write!(f, "Transcode error: {}", e),
            Error::Relay(e) => write!(f, "Relay error: {}", e),
            Error::InvalidStreamIndex(idx) => write!(f, "Invalid stream index: {}", idx),
            Error::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Media(e) => Some(e),
            Error::Transcode(e) => Some(e),
            Error::Relay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<MediaError> for Error {
    fn from(e: MediaError) -> Self {
        Error::Media(e)
    }
}

impl From<TranscodeError> for Error {
    fn from(e: TranscodeError) -> Self {
        Error::Transcode(e)
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Error::Relay(e)
    }
}

/// Media payload errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// AudioSpecificConfig could not be parsed
    InvalidAacConfig,
    /// The codec cannot derive a duration from a payload
    UnknownPacketDuration(CodecType),
    /// Audio stream advertises zero channels or a zero sample rate
    InvalidAudioParams,
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::InvalidAacConfig => write!(f, "Invalid AAC AudioSpecificConfig"),
            MediaError::UnknownPacketDuration(codec) => {
                write!(f, "Cannot compute packet duration for {}", codec)
            }
            MediaError::InvalidAudioParams => write!(f, "Invalid audio sample rate or channels"),
        }
    }
}

impl std::error::Error for MediaError {}

/// Which side of the transcoder a duration lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Decoder input packet
    Input,
    /// Encoder output packet
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Transcoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// No encoder available for the requested conversion
    NoEncoder {
        /// Source codec
        from: CodecType,
        /// Requested targets
        to: Vec<CodecType>,
    },
    /// No decoder available for the source codec
    NoDecoder(CodecType),
    /// PacketDuration failed for a stream
    PacketDuration {
        /// Stream index
        stream: usize,
        /// Input or output side
        direction: Direction,
        /// Underlying media error
        source: MediaError,
    },
    /// Decoder or encoder reported a failure
    Codec {
        /// Stream index
        stream: usize,
        /// Codec-provided message
        message: String,
    },
}

impl std::fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscodeError::NoEncoder { from, to } => {
                write!(f, "Convert {} -> {:?} failed: no encoder", from, to)
            }
            TranscodeError::NoDecoder(codec) => write!(f, "Decode {} failed: no decoder", codec),
            TranscodeError::PacketDuration {
                stream,
                direction,
                source,
            } => write!(
                f,
                "PacketDuration() failed for {} stream #{}: {}",
                direction, stream, source
            ),
            TranscodeError::Codec { stream, message } => {
                write!(f, "Codec failure on stream #{}: {}", stream, message)
            }
        }
    }
}

impl std::error::Error for TranscodeError {}

/// Relay channel errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Channel already has a publisher
    AlreadyPublishing(String),
    /// Query parameter could not be parsed
    InvalidQuery {
        /// Parameter name
        key: String,
        /// Raw value
        value: String,
    },
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::AlreadyPublishing(path) => {
                write!(f, "Channel already has a publisher: {}", path)
            }
            RelayError::InvalidQuery { key, value } => {
                write!(f, "Invalid query parameter {}={}", key, value)
            }
        }
    }
}

impl std::error::Error for RelayError {}
