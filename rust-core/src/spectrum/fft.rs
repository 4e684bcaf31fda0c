//! Real-valued forward/inverse FFT pair using realfft
//!
//! One planner run per block size; buffers are reused across blocks.

use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::PreconditionError;

/// Forward and inverse real FFT of a fixed size
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real-to-complex processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Complex-to-real processor
    c2r: Arc<dyn ComplexToReal<f64>>,

    /// Shared scratch for both directions
    scratch: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let c2r = planner.plan_fft_inverse(fft_size);

        let scratch_len = r2c.get_scratch_len().max(c2r.get_scratch_len());
        let scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        Self {
            fft_size,
            r2c,
            c2r,
            scratch,
        }
    }

    /// Forward transform: `fft_size` real samples -> `fft_size/2 + 1` bins
    ///
    /// `input` is used as scratch and holds garbage afterwards.
    pub fn forward(
        &mut self,
        input: &mut [f64],
        spectrum: &mut [Complex<f64>],
    ) -> Result<(), PreconditionError> {
        self.r2c
            .process_with_scratch(input, spectrum, &mut self.scratch)
            .map_err(|e| PreconditionError::Transform(e.to_string()))
    }

    /// Inverse transform: `fft_size/2 + 1` bins -> `fft_size` real samples
    ///
    /// Output is normalized by 1/N so that `inverse(forward(x)) == x`.
    /// `spectrum` is used as scratch and holds garbage afterwards.
    pub fn inverse(
        &mut self,
        spectrum: &mut [Complex<f64>],
        output: &mut [f64],
    ) -> Result<(), PreconditionError> {
        // DC and Nyquist bins of a real signal have no imaginary part
        if let Some(first) = spectrum.first_mut() {
            first.im = 0.0;
        }
        if self.fft_size % 2 == 0 {
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }
        }

        self.c2r
            .process_with_scratch(spectrum, output, &mut self.scratch)
            .map_err(|e| PreconditionError::Transform(e.to_string()))?;

        let scale = 1.0 / self.fft_size as f64;
        for s in output.iter_mut() {
            *s *= scale;
        }

        Ok(())
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}
