//! PicoTune CLI - render tune descriptions to WAV

use clap::{Parser, Subcommand};
use picotune::{RenderConfig, Renderer, SampleFormat, Tune, SAMPLE_RATE};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picotune")]
#[command(about = "Tiny chiptune synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a tune file to WAV
    Render {
        /// Tune description file
        input: PathBuf,

        /// Output WAV path (default: <output_dir>/<tune name>.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for the noise oscillator
        #[arg(long)]
        seed: Option<u64>,

        /// Sample format: pcm8, pcm16 or float32
        #[arg(short, long)]
        format: Option<SampleFormat>,

        /// Config file (default: <config dir>/picotune/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load a tune file and describe it without rendering
    Check {
        /// Tune description file
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            seed,
            format,
            config,
        } => {
            let mut render_config = RenderConfig::load_or_default(config.as_deref())?;
            if let Some(seed) = seed {
                render_config.seed = Some(seed);
            }
            if let Some(format) = format {
                render_config.format = format;
            }

            let tune = picotune::load_file(&input)?;
            let renderer = Renderer::new(render_config);
            let output = output.unwrap_or_else(|| renderer.output_path(&tune));

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }

            println!("PicoTune Renderer");
            println!("=================");
            println!("Input:       {}", input.display());
            println!("Output:      {}", output.display());
            println!("Tune:        {}", tune.name);
            println!("Format:      {}", renderer.config().format);
            println!();

            let stats = renderer.render_to_file(&tune, &output)?;
            stats.print_summary();
        }

        Commands::Check { input } => {
            let tune = picotune::load_file(&input)?;
            print_tune(&tune)?;
        }
    }

    Ok(())
}

fn print_tune(tune: &Tune) -> picotune::Result<()> {
    let mut instruments = BTreeSet::new();
    let mut patterns = BTreeSet::new();
    for phrase in tune.phrases.values() {
        for melody in &phrase.melodies {
            instruments.insert(format!("{} ({})", melody.instrument.name, melody.instrument.tone));
            patterns.insert(format!("{} ({} steps)", melody.pattern.name, melody.pattern.len()));
        }
    }

    println!("Tune:        {}", tune.name);
    println!("Instruments: {}", instruments.into_iter().collect::<Vec<_>>().join(", "));
    println!("Patterns:    {}", patterns.into_iter().collect::<Vec<_>>().join(", "));
    println!("Phrases:");

    let mut names: Vec<&String> = tune.phrases.keys().collect();
    names.sort();
    for name in names {
        let phrase = tune.phrase(name)?;
        println!(
            "  {:<12} tempo {:>3}  {}x{}  {} melodies  {} samples",
            phrase.name,
            phrase.tempo,
            phrase.beats,
            phrase.subbeats,
            phrase.melodies.len(),
            phrase.buffer_size()
        );
    }

    println!("Sequence:    {}", tune.sequence.join(" "));
    println!(
        "Duration:    {:.3} seconds at {} Hz",
        tune.duration_secs()?,
        SAMPLE_RATE
    );

    Ok(())
}
