//! Chunked streaming of a finished sample buffer to a blocking sink

use super::output::{AudioError, AudioOutput};
use crate::config::PlaybackConfig;

/// Blocking destination for fixed-size sample chunks
pub trait PlaybackSink {
    /// Queue `chunk`, blocking until the sink has accepted all of it
    fn write(&mut self, chunk: &[f64]) -> Result<(), AudioError>;

    /// Wait for queued samples to play out, then stop
    fn finish(&mut self) -> Result<(), AudioError>;
}

/// Write `samples` to `sink` in chunks of `chunk_size`
///
/// The last chunk may be shorter. Any sink error aborts the stream.
///
/// # Returns
/// Number of chunks written
pub fn stream_samples<S: PlaybackSink + ?Sized>(
    sink: &mut S,
    samples: &[f64],
    chunk_size: usize,
) -> Result<usize, AudioError> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = 0;

    let mut offset = 0;
    while offset < samples.len() {
        let end = (offset + chunk_size).min(samples.len());
        sink.write(&samples[offset..end])?;
        offset = end;
        chunks += 1;
    }

    sink.finish()?;
    Ok(chunks)
}

/// Play `samples` on the default output device
pub fn play(samples: &[f64], sample_rate: u32, config: &PlaybackConfig) -> Result<(), AudioError> {
    let mut output = AudioOutput::from_default_device(sample_rate, config)?;
    log::info!(
        "playing {} samples on {} ({} Hz, {} channels)",
        samples.len(),
        output.device_info().name,
        output.device_info().sample_rate,
        output.device_info().channels
    );

    let chunks = stream_samples(&mut output, samples, config.device_block_size)?;
    log::info!("streamed {} chunks", chunks);
    Ok(())
}
