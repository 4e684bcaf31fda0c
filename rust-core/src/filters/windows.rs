//! Trapezoidal analysis/synthesis window
//!
//! Linear ramp up over `lap` samples, flat unity region, mirrored ramp down.
//! The flat region passes samples through untouched; the ramps crossfade
//! adjacent blocks when the hop is `B - lap`.

use crate::error::ConfigError;

/// Generate trapezoid window coefficients
///
/// # Arguments
/// * `block_size` - Window length B
/// * `lap` - Ramp length at each edge (0 < lap <= B/2)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..B-1
pub fn generate_trapezoid(block_size: usize, lap: usize) -> Result<Vec<f64>, ConfigError> {
    if lap == 0 || lap > block_size / 2 {
        return Err(ConfigError::Lap { lap, block_size });
    }

    // w[n] = n/lap on the ramp, endpoint excluded
    let ramp: Vec<f64> = (0..lap).map(|n| n as f64 / lap as f64).collect();

    let mut window = Vec::with_capacity(block_size);
    window.extend_from_slice(&ramp);
    window.resize(block_size - lap, 1.0);
    window.extend(ramp.iter().rev());

    Ok(window)
}

/// Trapezoid window shared read-only by every block iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    coefficients: Vec<f64>,
    lap: usize,
}

impl Window {
    /// Build a trapezoid window of `block_size` samples
    pub fn trapezoid(block_size: usize, lap: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            coefficients: generate_trapezoid(block_size, lap)?,
            lap,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Ramp length at each edge
    pub fn lap(&self) -> usize {
        self.lap
    }

    /// Hop between consecutive blocks (`B - lap`)
    pub fn hop(&self) -> usize {
        self.coefficients.len() - self.lap
    }

    /// Multiply `block` by the window in-place
    #[inline]
    pub fn apply(&self, block: &mut [f64]) {
        for (s, w) in block.iter_mut().zip(self.coefficients.iter()) {
            *s *= w;
        }
    }
}
