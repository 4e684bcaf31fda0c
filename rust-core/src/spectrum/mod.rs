//! FFT plumbing and per-bin band gains

pub mod fft;
pub mod bands;

pub use fft::FftEngine;
pub use bands::{BandSpec, GainSpectrum, db_to_linear};
