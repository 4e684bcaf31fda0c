//! Audio output playback using cpal
//!
//! Blocking writer on top of cpal's callback model: samples go through a
//! ring buffer, `write` waits for free space, and the device callback
//! drains it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, SampleRate, Stream, SupportedBufferSize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;

use super::buffer::{AudioProducer, AudioRingBuffer};
use super::playback::PlaybackSink;
use crate::config::PlaybackConfig;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to query supported configs: {0}")]
    SupportedConfigs(String),

    #[error("Device has no 32-bit float output at {0} Hz")]
    UnsupportedSampleRate(u32),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Output underrun: device drained the buffer before playback finished")]
    Underrun,
}

/// Audio output device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// State shared between the writer and the device callback
#[derive(Default)]
struct StreamState {
    /// `play()` has been requested; the ring was full or is draining
    playing: AtomicBool,

    /// No more samples will be written; an empty ring is expected
    draining: AtomicBool,

    /// The callback ran dry while the writer was still streaming
    underrun: AtomicBool,

    /// First error reported by the backend
    failure: Mutex<Option<String>>,
}

impl StreamState {
    /// Record the outcome of one device callback
    ///
    /// Short fills before playback starts or once draining has begun are
    /// expected. A callback larger than the ring only needs a full ring.
    fn record_fill(&self, frames: usize, filled: usize, capacity: usize) {
        if filled < frames.min(capacity)
            && self.playing.load(Ordering::Acquire)
            && !self.draining.load(Ordering::Acquire)
        {
            self.underrun.store(true, Ordering::Release);
        }
    }

    fn check(&self) -> Result<(), AudioError> {
        if let Ok(failure) = self.failure.lock() {
            if let Some(message) = failure.as_ref() {
                return Err(AudioError::Stream(message.clone()));
            }
        }
        if self.underrun.load(Ordering::Acquire) {
            return Err(AudioError::Underrun);
        }
        Ok(())
    }
}

/// Blocking mono output stream
///
/// The device is paused when this value is dropped, on every exit path.
pub struct AudioOutput {
    stream: Stream,
    producer: AudioProducer,
    state: Arc<StreamState>,
    device_info: AudioDeviceInfo,
    started: bool,
    poll_interval: Duration,
    block_duration: Duration,
}

impl AudioOutput {
    /// Open the default output device at `sample_rate`
    pub fn from_default_device(
        sample_rate: u32,
        config: &PlaybackConfig,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        Self::from_device(device, sample_rate, config)
    }

    /// Open a specific output device at `sample_rate`
    pub fn from_device(
        device: Device,
        sample_rate: u32,
        config: &PlaybackConfig,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        // Fewest channels among f32 configs that support the rate
        let range = device
            .supported_output_configs()
            .map_err(|e| AudioError::SupportedConfigs(e.to_string()))?
            .filter(|r| {
                r.sample_format() == SampleFormat::F32
                    && r.min_sample_rate().0 <= sample_rate
                    && sample_rate <= r.max_sample_rate().0
            })
            .min_by_key(|r| r.channels())
            .ok_or(AudioError::UnsupportedSampleRate(sample_rate))?;

        let block = config.device_block_size as u32;
        let buffer_size = match range.buffer_size() {
            SupportedBufferSize::Range { min, max } if *min <= block && block <= *max => {
                BufferSize::Fixed(block)
            }
            _ => BufferSize::Default,
        };

        let mut stream_config = range.with_sample_rate(SampleRate(sample_rate)).config();
        stream_config.buffer_size = buffer_size;

        let channels = stream_config.channels;
        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };
        log::debug!("output config: {:?} on {}", stream_config, device_info.name);

        let capacity = config.ring_capacity();
        let (producer, mut consumer) = AudioRingBuffer::new(capacity).split();
        let state = Arc::new(StreamState::default());

        let data_state = Arc::clone(&state);
        let error_state = Arc::clone(&state);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels as usize;
                    let filled = consumer.fill_frames(data, channels as usize);
                    data_state.record_fill(frames, filled, capacity);
                },
                move |err| {
                    log::error!("audio output error: {}", err);
                    if let Ok(mut failure) = error_state.failure.lock() {
                        if failure.is_none() {
                            *failure = Some(err.to_string());
                        }
                    }
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        let block_secs = config.device_block_size as f64 / f64::from(sample_rate);
        let block_duration = Duration::from_secs_f64(block_secs);
        let poll_interval = (block_duration / 4).max(Duration::from_millis(1));

        Ok(Self {
            stream,
            producer,
            state,
            device_info,
            started: false,
            poll_interval,
            block_duration,
        })
    }

    fn start(&mut self) -> Result<(), AudioError> {
        if !self.started {
            self.state.playing.store(true, Ordering::Release);
            self.stream
                .play()
                .map_err(|e| AudioError::PlayStream(e.to_string()))?;
            self.started = true;
        }
        Ok(())
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

impl PlaybackSink for AudioOutput {
    fn write(&mut self, chunk: &[f64]) -> Result<(), AudioError> {
        let mut written = 0;
        while written < chunk.len() {
            self.state.check()?;

            written += self.producer.write(&chunk[written..]);
            if written < chunk.len() {
                // Ring is full: the device has enough to play, so start it
                // and wait for space
                self.start()?;
                thread::sleep(self.poll_interval);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AudioError> {
        self.state.draining.store(true, Ordering::Release);
        self.start()?;

        while self.producer.queued() > 0 {
            self.state.check()?;
            thread::sleep(self.poll_interval);
        }

        // Let the device play out its last buffer
        thread::sleep(self.block_duration);
        self.state.check()?;

        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        if self.started {
            if let Err(e) = self.stream.pause() {
                log::warn!("failed to stop output stream: {}", e);
            }
        }
    }
}
