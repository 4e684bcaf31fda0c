//! Band gain spectrum builder
//!
//! Maps a piecewise-constant band response onto the non-negative bins of a
//! real FFT. Split points are fractions of Nyquist; bin `i` of a size-B
//! transform sits at `2*i/B`.

use crate::error::ConfigError;

/// Convert a level in dB to linear amplitude
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Linear band gains plus the normalized split points between them
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpec {
    /// Linear gain per band, lowest band first
    gains: Vec<f64>,

    /// Ascending split points (fraction of Nyquist), `gains.len() - 1` entries
    splits: Vec<f64>,
}

impl BandSpec {
    /// Equal-width bands on a linear frequency scale
    ///
    /// # Arguments
    /// * `levels_db` - Band amplitudes in dB
    pub fn equal_width(levels_db: &[f64]) -> Result<Self, ConfigError> {
        let nbands = levels_db.len();
        let splits: Vec<f64> = (1..nbands).map(|b| b as f64 / nbands as f64).collect();
        Self::with_normalized_splits(levels_db, &splits)
    }

    /// Bands separated at absolute frequencies
    ///
    /// # Arguments
    /// * `levels_db` - Band amplitudes in dB
    /// * `splits_hz` - `levels_db.len() - 1` strictly increasing frequencies in Hz
    /// * `sample_rate` - Sample rate in Hz
    pub fn with_split_frequencies(
        levels_db: &[f64],
        splits_hz: &[f64],
        sample_rate: f64,
    ) -> Result<Self, ConfigError> {
        if !(sample_rate > 0.0) {
            return Err(ConfigError::SampleRate);
        }

        let nyquist = sample_rate / 2.0;
        if let Some(&highest) = splits_hz.last() {
            if highest > nyquist {
                log::warn!(
                    "split frequency {} Hz is above Nyquist ({} Hz); bands above it will be empty",
                    highest,
                    nyquist
                );
            }
        }

        let splits: Vec<f64> = splits_hz.iter().map(|&f| 2.0 * f / sample_rate).collect();
        Self::with_normalized_splits(levels_db, &splits)
    }

    /// Bands separated at normalized frequencies (fraction of Nyquist)
    pub fn with_normalized_splits(levels_db: &[f64], splits: &[f64]) -> Result<Self, ConfigError> {
        if levels_db.is_empty() {
            return Err(ConfigError::EmptyList { field: "amplitude" });
        }

        if let Some(&bad) = levels_db.iter().find(|db| !db.is_finite()) {
            return Err(ConfigError::Malformed {
                field: "amplitude",
                value: bad.to_string(),
            });
        }

        let expected = levels_db.len() - 1;
        if splits.len() != expected {
            return Err(ConfigError::SplitCount {
                bands: levels_db.len(),
                expected,
                found: splits.len(),
            });
        }

        for (index, &split) in splits.iter().enumerate() {
            if !split.is_finite() {
                return Err(ConfigError::Malformed {
                    field: "split",
                    value: split.to_string(),
                });
            }
            if split <= 0.0 {
                return Err(ConfigError::NonPositiveSplit(split));
            }
            if index > 0 && split <= splits[index - 1] {
                return Err(ConfigError::SplitOrder {
                    index,
                    previous: splits[index - 1],
                    current: split,
                });
            }
        }

        Ok(Self {
            gains: levels_db.iter().map(|&db| db_to_linear(db)).collect(),
            splits: splits.to_vec(),
        })
    }

    pub fn band_count(&self) -> usize {
        self.gains.len()
    }

    /// Linear gain per band
    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    /// Normalized split points
    pub fn splits(&self) -> &[f64] {
        &self.splits
    }

    /// Band index for every bin of a size-`block_size` real FFT
    ///
    /// Single forward scan: the band cursor only ever advances.
    pub fn bin_bands(&self, block_size: usize) -> Vec<usize> {
        let num_bins = block_size / 2 + 1;
        let mut bands = Vec::with_capacity(num_bins);
        let mut band = 0;

        for bin in 0..num_bins {
            let freq = 2.0 * bin as f64 / block_size as f64;
            while band < self.splits.len() && self.splits[band] <= freq {
                band += 1;
            }
            bands.push(band);
        }

        bands
    }

    /// Per-bin linear gain for a size-`block_size` real FFT
    pub fn gain_spectrum(&self, block_size: usize) -> GainSpectrum {
        let mut gains: Vec<f64> = self
            .bin_bands(block_size)
            .into_iter()
            .map(|band| self.gains[band])
            .collect();

        // DC and Nyquist carry no tonal content
        gains[0] = 0.0;
        if block_size % 2 == 0 {
            let nyquist = gains.len() - 1;
            gains[nyquist] = 0.0;
        }

        log::debug!(
            "gain spectrum: {} bands over {} bins, splits {:?}",
            self.band_count(),
            gains.len(),
            self.splits
        );

        GainSpectrum { gains, block_size }
    }
}

/// Linear gain per non-negative frequency bin, DC and Nyquist forced to zero
#[derive(Debug, Clone, PartialEq)]
pub struct GainSpectrum {
    gains: Vec<f64>,
    block_size: usize,
}

impl GainSpectrum {
    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    /// Number of bins (`block_size / 2 + 1`)
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Transform size this spectrum was built for
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}
