//! Error types for picotune

use std::fmt;
use thiserror::Error;

/// Which kind of declaration a melody line failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Instrument,
    Pattern,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Instrument => write!(f, "Instrument"),
            ReferenceKind::Pattern => write!(f, "Pattern"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PicoError {
    #[error("{kind} named \"{name}\" doesn't exist (referenced by phrase \"{phrase}\")")]
    Reference {
        phrase: String,
        kind: ReferenceKind,
        name: String,
    },

    #[error(
        "Please define a sequence with \"sequence s1 s2 s3...\" where s1/s2/s3/etc are names of phrases"
    )]
    MissingSequence,

    #[error("undefined phrase \"{0}\" in sequence")]
    UndefinedPhrase(String),

    #[error("Please define your tune's name with \"tune <tune name>\"")]
    MissingTuneName,

    #[error(
        "Mismatch between Pattern \"{pattern}\", which has {steps} steps, and Phrase \"{phrase}\", \
         which has {beats} beats and {subbeats} subbeats (any pattern it uses should have {expected} steps)",
        expected = .beats * .subbeats
    )]
    StepCountMismatch {
        pattern: String,
        steps: usize,
        phrase: String,
        beats: usize,
        subbeats: usize,
    },

    #[error(
        "Bad note: {name} from {note}. Valid note names are <C, C# or Db, D, D# or Eb, E, F, F# or Gb, G, G# or Ab, A, A# or Bb, B>"
    )]
    BadNoteName { name: String, note: String },

    #[error("Bad octave: {octave} from {note}. Valid octave number is 1..8")]
    BadOctave { octave: String, note: String },

    #[error("Invalid {attribute} \"{value}\" for {record} \"{name}\"")]
    InvalidAttribute {
        record: &'static str,
        name: String,
        attribute: String,
        value: String,
    },

    #[error("Phrase \"{phrase}\" is missing its {attribute}")]
    MissingAttribute {
        phrase: String,
        attribute: &'static str,
    },

    #[error("Melody line \"{line}\" in phrase \"{phrase}\" should be \"<instrument> <pattern>\"")]
    MalformedMelody { phrase: String, line: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PicoError>;
