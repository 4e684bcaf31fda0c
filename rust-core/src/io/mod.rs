//! Sample source and sink for WAV containers

pub mod wav;

pub use wav::{read_wav, write_wav, WavAudio};
