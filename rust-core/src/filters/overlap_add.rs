//! Overlap-add spectral band filter
//!
//! Slides a trapezoid window across the input at hop `B - lap`, reshapes each
//! windowed block in the frequency domain and sums the re-windowed result
//! back into a zero-initialized output of the same length.

use num_complex::Complex;

use crate::config::FilterConfig;
use crate::error::{Error, PreconditionError};
use crate::filters::windows::Window;
use crate::spectrum::bands::GainSpectrum;
use crate::spectrum::fft::FftEngine;

/// Output headroom limit applied after summation
pub const CLIP_LEVEL: f64 = 0.95;

/// Apply band gains to one block's spectrum in-place
///
/// With `phase_cancel` every bin is first replaced by its magnitude,
/// which forces a zero-phase reconstruction.
#[inline]
pub fn shape_spectrum(spectrum: &mut [Complex<f64>], gains: &[f64], phase_cancel: bool) {
    for (bin, &gain) in spectrum.iter_mut().zip(gains.iter()) {
        if phase_cancel {
            *bin = Complex::new(bin.norm() * gain, 0.0);
        } else {
            *bin *= gain;
        }
    }
}

/// Clip every sample to `[-CLIP_LEVEL, CLIP_LEVEL]`
pub fn clip(samples: &mut [f64]) {
    for s in samples.iter_mut() {
        *s = s.clamp(-CLIP_LEVEL, CLIP_LEVEL);
    }
}

/// Number of whole blocks that fit in `len` samples
pub fn block_count(len: usize, block_size: usize, hop: usize) -> usize {
    if len < block_size {
        0
    } else {
        (len - block_size) / hop + 1
    }
}

/// Streaming spectral band filter (overlap-add)
pub struct OverlapAddFilter {
    /// Analysis/synthesis window, length B
    window: Window,

    /// Per-bin linear gain, length B/2 + 1
    gains: GainSpectrum,

    /// Discard phase before reconstruction
    phase_cancel: bool,

    /// Forward/inverse transform pair of size B
    fft: FftEngine,

    /// Reusable time-domain block
    block: Vec<f64>,

    /// Reusable spectrum
    spectrum: Vec<Complex<f64>>,
}

impl OverlapAddFilter {
    /// Create a filter from prebuilt window and gain spectrum
    ///
    /// # Arguments
    /// * `window` - Trapezoid window; its length fixes the block size B
    /// * `gains` - Gain spectrum with B/2 + 1 entries
    /// * `phase_cancel` - Keep magnitude only
    pub fn new(
        window: Window,
        gains: GainSpectrum,
        phase_cancel: bool,
    ) -> Result<Self, PreconditionError> {
        let block_size = window.len();
        if gains.block_size() != block_size {
            return Err(PreconditionError::WindowLength {
                expected: gains.block_size(),
                found: block_size,
            });
        }

        let num_bins = block_size / 2 + 1;
        if gains.len() != num_bins {
            return Err(PreconditionError::GainLength {
                expected: num_bins,
                found: gains.len(),
            });
        }

        let fft = FftEngine::new(block_size);
        let block = vec![0.0; block_size];
        let spectrum = vec![Complex::new(0.0, 0.0); num_bins];

        Ok(Self {
            window,
            gains,
            phase_cancel,
            fft,
            block,
            spectrum,
        })
    }

    /// Validate `config` and build window and gains for `sample_rate`
    pub fn from_config(config: &FilterConfig, sample_rate: u32) -> Result<Self, Error> {
        config.validate()?;
        let window = config.window()?;
        let gains = config.band_spec(sample_rate)?.gain_spectrum(config.block_size);
        Ok(Self::new(window, gains, config.phase_cancel)?)
    }

    /// Filter a whole buffer
    ///
    /// # Returns
    /// Clipped output of the same length as `input`. Samples past the last
    /// whole block stay zero.
    pub fn process(&mut self, input: &[f64]) -> Result<Vec<f64>, PreconditionError> {
        let mut output = vec![0.0; input.len()];
        let blocks = self.accumulate(input, &mut output)?;
        clip(&mut output);

        log::info!(
            "filtered {} samples in {} blocks (block {}, hop {}, phase cancel {})",
            input.len(),
            blocks,
            self.block_size(),
            self.hop(),
            self.phase_cancel
        );

        Ok(output)
    }

    /// Overlap-add every whole block of `input` into `output` without clipping
    ///
    /// # Returns
    /// Number of blocks processed
    pub fn accumulate(
        &mut self,
        input: &[f64],
        output: &mut [f64],
    ) -> Result<usize, PreconditionError> {
        if output.len() != input.len() {
            return Err(PreconditionError::BufferLength {
                expected: input.len(),
                found: output.len(),
            });
        }

        let block_size = self.block_size();
        let hop = self.hop();
        let mut start = 0;
        let mut blocks = 0;

        while start + block_size <= input.len() {
            self.process_block(&input[start..start + block_size])?;

            for (out, &s) in output[start..start + block_size].iter_mut().zip(self.block.iter()) {
                *out += s;
            }

            start += hop;
            blocks += 1;
        }

        Ok(blocks)
    }

    /// Window, transform, shape, inverse-transform and re-window one block.
    /// Result is left in `self.block`.
    fn process_block(&mut self, input: &[f64]) -> Result<(), PreconditionError> {
        // 1. Analysis window
        self.block.copy_from_slice(input);
        self.window.apply(&mut self.block);

        // 2. Forward FFT
        self.fft.forward(&mut self.block, &mut self.spectrum)?;

        // 3-4. Phase cancellation and band gains
        shape_spectrum(&mut self.spectrum, self.gains.gains(), self.phase_cancel);

        // 5. Inverse FFT
        self.fft.inverse(&mut self.spectrum, &mut self.block)?;

        // 6. Synthesis window
        self.window.apply(&mut self.block);

        Ok(())
    }

    /// Block size B
    pub fn block_size(&self) -> usize {
        self.window.len()
    }

    /// Hop between block starts (`B - lap`)
    pub fn hop(&self) -> usize {
        self.window.hop()
    }

    pub fn gains(&self) -> &GainSpectrum {
        &self.gains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::bands::BandSpec;
    use approx::assert_abs_diff_eq;

    fn filter(block_size: usize, lap: usize, levels_db: &[f64], phase_cancel: bool) -> OverlapAddFilter {
        let window = Window::trapezoid(block_size, lap).unwrap();
        let gains = BandSpec::equal_width(levels_db)
            .unwrap()
            .gain_spectrum(block_size);
        OverlapAddFilter::new(window, gains, phase_cancel).unwrap()
    }

    /// Indices where exactly one block covers the sample with unity window
    fn flat_indices(len: usize, block_size: usize, lap: usize) -> Vec<usize> {
        let hop = block_size - lap;
        let covered = (block_count(len, block_size, hop) - 1) * hop + block_size;
        (0..covered)
            .filter(|&i| {
                let offset = i % hop;
                offset >= lap && offset < block_size - lap
            })
            .collect()
    }

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(16, 8, 6), 2);
        assert_eq!(block_count(8, 8, 6), 1);
        assert_eq!(block_count(7, 8, 6), 0);
        assert_eq!(block_count(20, 8, 6), 3);
    }

    #[test]
    fn test_shape_spectrum_keeps_phase() {
        let mut spectrum = vec![Complex::new(3.0, 4.0), Complex::new(-1.0, 2.0)];
        shape_spectrum(&mut spectrum, &[0.5, 2.0], false);
        assert_eq!(spectrum[0], Complex::new(1.5, 2.0));
        assert_eq!(spectrum[1], Complex::new(-2.0, 4.0));
    }

    #[test]
    fn test_shape_spectrum_phase_cancel() {
        let mut spectrum = vec![Complex::new(3.0, 4.0), Complex::new(0.0, -2.0)];
        shape_spectrum(&mut spectrum, &[0.5, 1.0], true);
        assert_eq!(spectrum[0], Complex::new(2.5, 0.0));
        assert_eq!(spectrum[1], Complex::new(2.0, 0.0));
    }

    #[test]
    fn test_clip() {
        let mut samples = vec![-3.0, -0.95, 0.2, 0.96, 10.0];
        clip(&mut samples);
        assert_eq!(samples, vec![-0.95, -0.95, 0.2, 0.95, 0.95]);
    }

    #[test]
    fn test_mismatched_gains_rejected() {
        let window = Window::trapezoid(64, 2).unwrap();
        let gains = BandSpec::equal_width(&[0.0]).unwrap().gain_spectrum(128);
        let result = OverlapAddFilter::new(window, gains, false);
        assert!(matches!(
            result,
            Err(PreconditionError::WindowLength { expected: 128, found: 64 })
        ));
    }

    #[test]
    fn test_unity_pass_through_in_flat_region() {
        let (block_size, lap) = (64, 2);
        let hop = block_size - lap;
        let mut f = filter(block_size, lap, &[0.0], false);
        let w = Window::trapezoid(block_size, lap).unwrap();

        let input: Vec<f64> = (0..300)
            .map(|n| 0.5 * (0.9 * n as f64).sin() + 0.2 * (2.1 * n as f64).cos())
            .collect();
        let output = f.process(&input).unwrap();
        assert_eq!(output.len(), input.len());

        // Unity gains remove only the DC and Nyquist content of each windowed block
        for i in flat_indices(input.len(), block_size, lap) {
            let start = i / hop * hop;
            let block = &input[start..start + block_size];
            let dc: f64 = block.iter().zip(w.coefficients()).map(|(x, c)| x * c).sum();
            let nyquist: f64 = block
                .iter()
                .zip(w.coefficients())
                .enumerate()
                .map(|(n, (x, c))| if n % 2 == 0 { x * c } else { -x * c })
                .sum();
            let sign = if (i - start) % 2 == 0 { 1.0 } else { -1.0 };
            let expected = input[i] - (dc + sign * nyquist) / block_size as f64;

            assert_abs_diff_eq!(output[i], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_silence_band() {
        let mut f = filter(64, 2, &[-120.0], false);
        let input: Vec<f64> = (0..500).map(|n| 0.9 * (0.3 * n as f64).sin()).collect();
        let output = f.process(&input).unwrap();
        assert!(output.iter().all(|&s| s.abs() < 1e-5));
    }

    #[test]
    fn test_trailing_region_untouched() {
        let mut f = filter(8, 2, &[0.0], false);
        let input: Vec<f64> = (0..19).map(|n| 0.3 * (1.1 * n as f64).sin()).collect();
        let output = f.process(&input).unwrap();

        // Blocks at 0 and 6 cover 0..14; a block at 12 would run past the end
        assert_eq!(output.len(), 19);
        let covered = (block_count(19, 8, 6) - 1) * 6 + 8;
        assert_eq!(covered, 14);
        assert!(output[covered..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_small_constant_scenario() {
        let mut f = filter(8, 2, &[0.0], false);
        let input = vec![0.5; 16];
        let output = f.process(&input).unwrap();

        // Blocks at 0 and 6 each lose their mean (0.3125) before re-windowing;
        // samples 14 and 15 are never covered
        let expected = [
            0.0, -0.03125, 0.1875, 0.1875, 0.1875, 0.1875, -0.03125, -0.03125, 0.1875, 0.1875,
            0.1875, 0.1875, -0.03125, 0.0, 0.0, 0.0,
        ];
        assert_eq!(output.len(), expected.len());
        for (a, b) in output.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_eq!(output[0], 0.0);
        assert_eq!(output[14], 0.0);
        assert_eq!(output[15], 0.0);
    }

    #[test]
    fn test_clipping_bounds() {
        // +40 dB on a loud signal must still be held within headroom
        let mut f = filter(64, 8, &[40.0], false);
        let input: Vec<f64> = (0..300).map(|n| (0.7 * n as f64).sin()).collect();
        let output = f.process(&input).unwrap();

        assert!(output.iter().all(|s| s.abs() <= CLIP_LEVEL));
        assert!(output.iter().any(|s| (s.abs() - CLIP_LEVEL).abs() < 1e-12));
    }

    #[test]
    fn test_phase_cancel_changes_output() {
        let input: Vec<f64> = (0..300).map(|n| 0.4 * (0.45 * n as f64).sin()).collect();

        let plain = filter(64, 4, &[0.0], false).process(&input).unwrap();
        let cancelled = filter(64, 4, &[0.0], true).process(&input).unwrap();

        assert_eq!(plain.len(), cancelled.len());
        assert!(cancelled.iter().all(|s| s.abs() <= CLIP_LEVEL));
        let diff: f64 = plain
            .iter()
            .zip(cancelled.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff > 1e-3);
    }

    #[test]
    fn test_input_shorter_than_block() {
        let mut f = filter(64, 2, &[0.0], false);
        let output = f.process(&[0.25; 10]).unwrap();
        assert_eq!(output, vec![0.0; 10]);
    }

    #[test]
    fn test_from_config() {
        let config = FilterConfig {
            block_size: 256,
            band_levels_db: vec![-6.0, 0.0],
            split_frequencies_hz: Some(vec![6000.0]),
            ..Default::default()
        };
        let f = OverlapAddFilter::from_config(&config, 48000).unwrap();
        assert_eq!(f.block_size(), 256);
        assert_eq!(f.hop(), 248);
        assert_eq!(f.gains().len(), 129);

        let bad = FilterConfig {
            block_size: 100,
            ..Default::default()
        };
        assert!(matches!(
            OverlapAddFilter::from_config(&bad, 48000),
            Err(Error::Config(_))
        ));
    }
}
