//! Conversion command line

use std::time::Duration;

use crate::error::{Error, Result};
use crate::media::CodecType;

/// Conversion behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Stop at the first packet later than this
    pub duration: Option<Duration>,
    /// Log the stream mapping and every packet
    pub verbose: bool,
    /// Pace output to wall-clock time
    pub realtime: bool,
    /// Codecs the output accepts; empty accepts anything
    pub output_codec_types: Vec<CodecType>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn realtime(mut self, enabled: bool) -> Self {
        self.realtime = enabled;
        self
    }

    pub fn output_codec_types(mut self, types: Vec<CodecType>) -> Self {
        self.output_codec_types = types;
        self
    }
}

/// Parsed `-i <input> [-t <seconds>] [-v] [-re] <output>` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertArgs {
    pub input: String,
    pub output: String,
    pub options: ConvertOptions,
}

#[derive(Clone, Copy)]
enum Pending {
    Input,
    Duration,
}

impl ConvertArgs {
    /// Parse arguments, program name excluded
    ///
    /// A value that follows neither `-i` nor `-t` is the output; the last
    /// one wins. `-t 0` means no cutoff.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = None;
        let mut output = None;
        let mut options = ConvertOptions::default();
        let mut pending = None;

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "-i" => pending = Some(Pending::Input),
                "-t" => pending = Some(Pending::Duration),
                "-v" => options.verbose = true,
                "-re" => options.realtime = true,
                value => match pending.take() {
                    Some(Pending::Input) => input = Some(value.to_string()),
                    Some(Pending::Duration) => options.duration = parse_seconds(value)?,
                    None => output = Some(value.to_string()),
                },
            }
        }

        let input = input
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidArgs("input file not specified".into()))?;
        let output = output
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidArgs("output file not specified".into()))?;

        Ok(Self {
            input,
            output,
            options,
        })
    }
}

fn parse_seconds(value: &str) -> Result<Option<Duration>> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("invalid duration: {}", value)))?;
    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::InvalidArgs(format!("invalid duration: {}", value)))?;
    Ok(Some(duration).filter(|d| !d.is_zero()))
}
