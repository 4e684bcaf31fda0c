//! Real-time playback of the filtered buffer with cpal

pub mod buffer;
pub mod output;
pub mod playback;

pub use buffer::AudioRingBuffer;
pub use output::{AudioDeviceInfo, AudioError, AudioOutput};
pub use playback::{play, stream_samples, PlaybackSink};
