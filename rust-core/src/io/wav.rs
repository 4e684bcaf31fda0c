//! Mono WAV source and sink
//!
//! Decodes 16-bit integer or 32-bit float mono WAV into normalized `f64`
//! samples and writes them back with the input's format.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// 16-bit full scale
const I16_SCALE: f64 = 32768.0;

/// Decoded mono audio plus the container format it came from
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub samples: Vec<f64>,
    pub spec: WavSpec,
}

impl WavAudio {
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.spec.sample_rate)
    }
}

/// Reject anything this tool does not decode
pub fn check_spec(spec: &WavSpec) -> std::result::Result<(), ConfigError> {
    if spec.channels != 1 {
        return Err(ConfigError::UnsupportedChannels(spec.channels));
    }
    if spec.sample_rate == 0 {
        return Err(ConfigError::SampleRate);
    }
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) | (SampleFormat::Float, 32) => Ok(()),
        (SampleFormat::Int, bits) => Err(ConfigError::UnsupportedFormat {
            bits,
            format: "integer",
        }),
        (SampleFormat::Float, bits) => Err(ConfigError::UnsupportedFormat {
            bits,
            format: "float",
        }),
    }
}

/// Read a mono WAV file
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<WavAudio> {
    let file = File::open(path.as_ref()).map_err(hound::Error::IoError)?;
    read_wav_from(BufReader::new(file))
}

/// Read mono WAV data from any reader
pub fn read_wav_from<R: Read>(reader: R) -> Result<WavAudio> {
    let reader = WavReader::new(reader)?;
    let spec = reader.spec();
    check_spec(&spec)?;

    let samples = match spec.sample_format {
        SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.map(|s| f64::from(s) / I16_SCALE))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    log::debug!(
        "read {} samples at {} Hz ({}-bit {:?})",
        samples.len(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok(WavAudio { samples, spec })
}

/// Write samples to a WAV file using `spec`
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f64], spec: WavSpec) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(hound::Error::IoError)?;
    write_wav_to(BufWriter::new(file), samples, spec)
}

/// Write samples as WAV data to any seekable writer
pub fn write_wav_to<W: Write + Seek>(writer: W, samples: &[f64], spec: WavSpec) -> Result<()> {
    check_spec(&spec)?;
    let mut writer = WavWriter::new(writer, spec)?;

    match spec.sample_format {
        SampleFormat::Int => {
            for &sample in samples {
                let s = (sample * I16_SCALE).clamp(f64::from(i16::MIN), f64::from(i16::MAX));
                writer.write_sample(s as i16)?;
            }
        }
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample as f32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
