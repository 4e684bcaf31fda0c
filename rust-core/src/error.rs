//! Error taxonomy for the band filter
//!
//! Configuration problems are detected before any audio is touched,
//! precondition errors signal a broken contract between components,
//! and device errors come from the playback backend.

use thiserror::Error;

use crate::audio::AudioError;

/// Bad parameter combination, detected before processing starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} list is empty")]
    EmptyList { field: &'static str },

    #[error("{field} list contains a malformed value: {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("expected {expected} split frequencies for {bands} bands, found {found}")]
    SplitCount {
        bands: usize,
        expected: usize,
        found: usize,
    },

    #[error("split frequencies must be strictly increasing ({previous} then {current} at position {index})")]
    SplitOrder {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("split frequency must be positive (found {0})")]
    NonPositiveSplit(f64),

    #[error("block size must be a power of two of at least 2 (found {0})")]
    BlockSize(usize),

    #[error("taper length {lap} is invalid for block size {block_size} (need 0 < lap <= block_size / 2)")]
    Lap { lap: usize, block_size: usize },

    #[error("device block size must be positive")]
    DeviceBlockSize,

    #[error("sample rate must be positive")]
    SampleRate,

    #[error("only mono input is supported (found {0} channels)")]
    UnsupportedChannels(u16),

    #[error("unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { bits: u16, format: &'static str },
}

/// Internal contract violation between components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("window length {found} does not match block size {expected}")]
    WindowLength { expected: usize, found: usize },

    #[error("gain spectrum length {found} does not match bin count {expected}")]
    GainLength { expected: usize, found: usize },

    #[error("output buffer length {found} does not match input length {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("transform failed: {0}")]
    Transform(String),
}

/// Any failure the band filter can surface
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("audio device error: {0}")]
    Device(#[from] AudioError),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
