//! Bandfilter - Overlap-Add Spectral Band Filter
//!
//! Reconstructs a filtered mono waveform from overlapping, windowed,
//! frequency-domain-modified blocks, then writes it to WAV or streams it to
//! an output device.

pub mod audio;
pub mod config;
pub mod error;
pub mod filters;
pub mod io;
pub mod spectrum;

pub use config::{FilterConfig, PlaybackConfig};
pub use error::{ConfigError, Error, PreconditionError};
pub use filters::OverlapAddFilter;
pub use spectrum::{BandSpec, GainSpectrum};

/// Filter a whole buffer with `config` at `sample_rate`
pub fn filter_samples(samples: &[f64], sample_rate: u32, config: &FilterConfig) -> error::Result<Vec<f64>> {
    let mut filter = OverlapAddFilter::from_config(config, sample_rate)?;
    Ok(filter.process(samples)?)
}
