//! Filter and playback configuration
//!
//! Built once at startup and passed by reference to the builders and the
//! engine. Nothing here is mutated after validation.

use crate::error::ConfigError;
use crate::filters::windows::Window;
use crate::spectrum::bands::BandSpec;

/// Spectral band filter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Transform block size B (power of two, default: 4096)
    pub block_size: usize,

    /// Taper length at each block edge (default: B/32, at least 1)
    pub lap: Option<usize>,

    /// Band amplitudes in dB, lowest band first (default: single 0 dB band)
    pub band_levels_db: Vec<f64>,

    /// Split frequencies in Hz between adjacent bands.
    /// `None` divides the spectrum into equal-width bands.
    pub split_frequencies_hz: Option<Vec<f64>>,

    /// Discard phase before reconstruction
    pub phase_cancel: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            block_size: 4096,
            lap: None,
            band_levels_db: vec![0.0],
            split_frequencies_hz: None,
            phase_cancel: false,
        }
    }
}

impl FilterConfig {
    /// Effective taper length
    pub fn lap(&self) -> usize {
        self.lap.unwrap_or_else(|| (self.block_size / 32).max(1))
    }

    /// Distance between consecutive block starts
    pub fn hop(&self) -> usize {
        self.block_size.saturating_sub(self.lap())
    }

    /// Check everything that does not depend on the input sample rate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 2 || !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSize(self.block_size));
        }

        let lap = self.lap();
        if lap == 0 || lap > self.block_size / 2 {
            return Err(ConfigError::Lap {
                lap,
                block_size: self.block_size,
            });
        }

        if self.band_levels_db.is_empty() {
            return Err(ConfigError::EmptyList { field: "amplitude" });
        }

        if let Some(splits) = &self.split_frequencies_hz {
            let expected = self.band_levels_db.len() - 1;
            if splits.len() != expected {
                return Err(ConfigError::SplitCount {
                    bands: self.band_levels_db.len(),
                    expected,
                    found: splits.len(),
                });
            }
        }

        Ok(())
    }

    /// Build the analysis/synthesis window
    pub fn window(&self) -> Result<Window, ConfigError> {
        Window::trapezoid(self.block_size, self.lap())
    }

    /// Build the band specification for the given input sample rate
    pub fn band_spec(&self, sample_rate: u32) -> Result<BandSpec, ConfigError> {
        match &self.split_frequencies_hz {
            Some(splits) => BandSpec::with_split_frequencies(
                &self.band_levels_db,
                splits,
                f64::from(sample_rate),
            ),
            None => BandSpec::equal_width(&self.band_levels_db),
        }
    }
}

/// Playback streaming configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Samples per device write, independent of the filter block size
    pub device_block_size: usize,

    /// Ring capacity in device blocks
    pub buffer_blocks: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            device_block_size: 4096,
            buffer_blocks: 4,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_block_size == 0 {
            return Err(ConfigError::DeviceBlockSize);
        }
        Ok(())
    }

    /// Ring buffer capacity in samples (never less than two blocks)
    pub fn ring_capacity(&self) -> usize {
        self.device_block_size * self.buffer_blocks.max(2)
    }
}

/// Parse a comma-separated list of numbers
///
/// # Arguments
/// * `field` - Name used in error messages
/// * `text` - Input such as `"-120, 0"`
pub fn parse_list(field: &'static str, text: &str) -> Result<Vec<f64>, ConfigError> {
    if text.trim().is_empty() {
        return Err(ConfigError::EmptyList { field });
    }

    text.split(',')
        .map(str::trim)
        .map(|item| match item.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ConfigError::Malformed {
                field,
                value: item.to_string(),
            }),
        })
        .collect()
}
