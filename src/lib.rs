//! # PicoTune - Tiny Chiptune Synthesizer
//!
//! PicoTune turns a small text description of a tune into stereo audio.
//! Tunes are built from a handful of pieces:
//!
//! - **Instruments**: a tone (square, sine, triangle, noise, saw) with note
//!   length, volume, pan and reverb settings
//! - **Patterns**: compressed step strings such as `C4D4--.E4`
//! - **Phrases**: a tempo and grid (beats × subbeats) playing one or more
//!   instrument/pattern melodies together
//! - **Sequence**: the order phrases are played in
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let source = "
//! tune demo
//! sequence verse verse
//! instrument lead
//!   tone square
//!   volume half
//! pattern riff C4E4G4-
//! phrase verse
//!   tempo 120
//!   beats 2
//!   subbeats 2
//!   melodies
//!     lead riff
//! ";
//!
//! let tune = picotune::load(source)?;
//! let rendered = tune.render(&mut StdRng::seed_from_u64(7))?;
//!
//! // Two phrases of one second each at 11468 Hz
//! assert_eq!(rendered.buffer().len(), 2 * 11468);
//! # Ok::<(), picotune::PicoError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. [`parser`] groups source lines into untyped records
//! 2. [`assembler`] builds instruments, patterns and phrases and checks
//!    every reference between them
//! 3. [`phrase`] synthesizes one phrase buffer from its melodies
//! 4. [`tune`] renders each distinct phrase once and lays them out in
//!    sequence order
//! 5. [`render`] hands the finished frames to a WAV encoder
//!
//! All audio is produced at [`instrument::SAMPLE_RATE`] (11468 Hz).

pub mod assembler;
pub mod config;
pub mod error;
pub mod instrument;
pub mod melody;
pub mod oscillator;
pub mod parser;
pub mod pattern;
pub mod phrase;
pub mod render;
pub mod sample;
pub mod tune;

pub use config::{RenderConfig, SampleFormat};
pub use error::{PicoError, ReferenceKind, Result};
pub use instrument::{Instrument, Level, Pan, Reverb, SAMPLE_RATE};
pub use melody::Melody;
pub use oscillator::{Oscillator, Tone};
pub use pattern::{Pattern, Step};
pub use phrase::Phrase;
pub use render::{Encoder, RenderStats, Renderer, WavEncoder};
pub use sample::Sample;
pub use tune::{RenderedTune, Tune};

use std::path::Path;

/// Parse and assemble tune source text.
pub fn load(source: &str) -> Result<Tune> {
    let records = parser::parse(source);
    assembler::assemble(&records)
}

/// Read a tune description from disk and assemble it.
pub fn load_file(path: impl AsRef<Path>) -> Result<Tune> {
    let source = std::fs::read_to_string(path.as_ref())?;
    load(&source)
}
