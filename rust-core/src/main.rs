//! Bandfilter command-line tool
//!
//! Filters a mono WAV file through the overlap-add band filter, optionally
//! writes the result, then plays it on the default output device.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bandfilter::audio::play;
use bandfilter::config::parse_list;
use bandfilter::io::{read_wav, write_wav};
use bandfilter::{FilterConfig, OverlapAddFilter, PlaybackConfig};

#[derive(Parser, Debug)]
#[command(name = "bandfilter", version, about = "Spectral band filter for mono WAV audio")]
struct Cli {
    /// WAV output file
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Comma-separated list of band amplitudes in dB, lowest band first
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    ampls: String,

    /// Comma-separated list of split frequencies in Hz between bands
    #[arg(short, long)]
    splits: Option<String>,

    /// Transform block size in samples (power of two)
    #[arg(short, long, default_value_t = 4096)]
    blocksize: usize,

    /// Taper length in samples (default: blocksize / 32)
    #[arg(short, long)]
    lap: Option<usize>,

    /// Discard phase before reconstruction
    #[arg(short, long)]
    phase_cancel: bool,

    /// Samples per device write during playback
    #[arg(long, default_value_t = 4096)]
    device_blocksize: usize,

    /// Skip playback
    #[arg(long)]
    no_play: bool,

    /// WAV input file
    wavfile: PathBuf,
}

impl Cli {
    fn filter_config(&self) -> Result<FilterConfig> {
        let band_levels_db = parse_list("amplitude", &self.ampls)?;
        let split_frequencies_hz = self
            .splits
            .as_deref()
            .map(|text| parse_list("split", text))
            .transpose()?;

        Ok(FilterConfig {
            block_size: self.blocksize,
            lap: self.lap,
            band_levels_db,
            split_frequencies_hz,
            phase_cancel: self.phase_cancel,
        })
    }

    fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            device_block_size: self.device_blocksize,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = cli.filter_config()?;
    config.validate()?;
    let playback = cli.playback_config();
    playback.validate()?;

    let audio = read_wav(&cli.wavfile)
        .with_context(|| format!("failed to read {}", cli.wavfile.display()))?;
    log::info!(
        "loaded {} ({} samples, {:.2} s at {} Hz)",
        cli.wavfile.display(),
        audio.samples.len(),
        audio.duration_seconds(),
        audio.sample_rate()
    );

    let mut filter = OverlapAddFilter::from_config(&config, audio.sample_rate())?;
    let filtered = filter.process(&audio.samples)?;

    if let Some(outfile) = &cli.outfile {
        write_wav(outfile, &filtered, audio.spec)
            .with_context(|| format!("failed to write {}", outfile.display()))?;
        log::info!("wrote {}", outfile.display());
    }

    if !cli.no_play {
        play(&filtered, audio.sample_rate(), &playback).context("playback failed")?;
    }

    Ok(())
}
