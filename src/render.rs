//! Offline rendering of tunes to WAV files
//!
//! Synthesis hands its frames to an [`Encoder`]; [`WavEncoder`] is the one
//! that writes files, using hound.

use crate::config::{RenderConfig, SampleFormat};
use crate::error::Result;
use crate::instrument::SAMPLE_RATE;
use crate::sample::Sample;
use crate::tune::{RenderedTune, Tune};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Receives finished stereo frames at a fixed sample rate
pub trait Encoder {
    fn encode(&mut self, sample_rate: u32, frames: &[Sample]) -> Result<()>;
}

/// Writes stereo WAV files
#[derive(Debug, Clone)]
pub struct WavEncoder {
    path: PathBuf,
    format: SampleFormat,
}

impl WavEncoder {
    pub fn new(path: impl Into<PathBuf>, format: SampleFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Encoder for WavEncoder {
    fn encode(&mut self, sample_rate: u32, frames: &[Sample]) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: self.format.bits_per_sample(),
            sample_format: match self.format {
                SampleFormat::Float32 => hound::SampleFormat::Float,
                SampleFormat::Pcm8 | SampleFormat::Pcm16 => hound::SampleFormat::Int,
            },
        };

        debug!(
            "Encoding {} frames at {} Hz to {}",
            frames.len(),
            sample_rate,
            self.path().display()
        );
        let mut writer = hound::WavWriter::create(self.path(), spec)?;

        for frame in frames {
            for value in frame.to_array() {
                // Clamp to prevent overflow
                let clamped = value.clamp(-1.0, 1.0);
                match self.format {
                    SampleFormat::Pcm8 => writer.write_sample((clamped * 127.0) as i8)?,
                    SampleFormat::Pcm16 => writer.write_sample((clamped * 32767.0) as i16)?,
                    SampleFormat::Float32 => writer.write_sample(clamped as f32)?,
                }
            }
        }

        writer.finalize()?;
        Ok(())
    }
}

/// Renderer for assembled tunes
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Synthesize without writing anything
    pub fn render_tune(&self, tune: &Tune) -> Result<RenderedTune> {
        tune.render(&mut self.rng())
    }

    /// `<output_dir>/<tune name>.wav`
    pub fn output_path(&self, tune: &Tune) -> PathBuf {
        let file_name = format!("{}.wav", tune.name);
        match &self.config.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Render a tune and write it to `output_path` as WAV
    pub fn render_to_file(&self, tune: &Tune, output_path: &Path) -> Result<RenderStats> {
        let rendered = self.render_tune(tune)?;
        let stats = RenderStats::from_frames(rendered.buffer());

        let mut encoder = WavEncoder::new(output_path, self.config.format);
        encoder.encode(rendered.sample_rate(), rendered.buffer())?;

        info!(
            "Wrote \"{}\": {} frames ({}) to {}",
            rendered.name(),
            stats.frame_count,
            self.config.format,
            output_path.display()
        );

        Ok(stats)
    }
}

/// Statistics about rendered audio
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStats {
    pub duration: f64,
    pub frame_count: usize,
    pub peak_left: f64,
    pub peak_right: f64,
    pub rms_left: f64,
    pub rms_right: f64,
}

impl RenderStats {
    pub fn from_frames(frames: &[Sample]) -> Self {
        let frame_count = frames.len();
        let count = frame_count.max(1) as f64;

        let peak = |channel: fn(&Sample) -> f64| {
            frames.iter().map(|s| channel(s).abs()).fold(0.0f64, f64::max)
        };
        let rms = |channel: fn(&Sample) -> f64| {
            (frames.iter().map(|s| channel(s).powi(2)).sum::<f64>() / count).sqrt()
        };

        Self {
            duration: frame_count as f64 / SAMPLE_RATE as f64,
            frame_count,
            peak_left: peak(|s| s.left),
            peak_right: peak(|s| s.right),
            rms_left: rms(|s| s.left),
            rms_right: rms(|s| s.right),
        }
    }

    pub fn print_summary(&self) {
        println!("Render Statistics:");
        println!("  Duration:       {:.3} seconds", self.duration);
        println!("  Frames:         {}", self.frame_count);
        println!("  Sample rate:    {} Hz", SAMPLE_RATE);
        println!("  Peak (L/R):     {:.3} / {:.3}", self.peak_left, self.peak_right);
        println!("  RMS (L/R):      {:.3} / {:.3}", self.rms_left, self.rms_right);
    }
}
