//! Line-oriented parser for the tune description format
//!
//! ```text
//! tune my song
//! sequence verse verse chorus
//! instrument lead
//!   tone square
//! pattern riff C4D4--.E4
//! phrase verse
//!   tempo 120
//!   beats 4
//!   subbeats 2
//!   melodies
//!     lead riff
//! ```
//!
//! The parser does no validation: it only groups lines into records. The
//! assembler decides whether the records make a tune.

use crate::pattern::{REST, SUSTAIN};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

lazy_static::lazy_static! {
    /// A note token (`C4`, `F#2`, `Bb7`) or a single rest/sustain marker
    static ref STEP_TOKEN: Regex = Regex::new(r"[a-zA-Z][#b]?\d|\.|-").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Tune,
    Sequence,
    Instrument,
    Phrase,
    Pattern,
}

impl RecordKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "tune" => Some(RecordKind::Tune),
            "sequence" => Some(RecordKind::Sequence),
            "instrument" => Some(RecordKind::Instrument),
            "phrase" => Some(RecordKind::Phrase),
            "pattern" => Some(RecordKind::Pattern),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            RecordKind::Tune => "tune",
            RecordKind::Sequence => "sequence",
            RecordKind::Instrument => "instrument",
            RecordKind::Phrase => "phrase",
            RecordKind::Pattern => "pattern",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// One keyword-led block of the source, still untyped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    /// 1-based line the record starts on
    pub line: usize,
    pub name: String,
    /// Phrase names for `sequence`, resolved step tokens for `pattern`
    pub list: Vec<String>,
    /// `<attribute> <value>` lines; the value has its whitespace removed
    pub attributes: HashMap<String, String>,
    /// Melody lines of a phrase, split on whitespace
    pub melodies: Option<Vec<Vec<String>>>,
}

impl Record {
    fn new(kind: RecordKind, line: usize) -> Self {
        Self {
            kind,
            line,
            name: String::new(),
            list: Vec::new(),
            attributes: HashMap::new(),
            melodies: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Split source text into records.
pub fn parse(source: &str) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::new();
    let mut collecting_melodies = false;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        if let Some(kind) = RecordKind::from_keyword(parts[0]) {
            collecting_melodies = false;
            let mut record = Record::new(kind, index + 1);

            match kind {
                RecordKind::Sequence => {
                    record.list = parts[1..].iter().map(|s| s.to_string()).collect();
                }
                RecordKind::Pattern => {
                    record.name = parts.get(1).map(|s| s.to_string()).unwrap_or_default();
                    record.list = pattern_steps(&parts.get(2..).unwrap_or_default().concat());
                }
                _ => record.name = parts[1..].concat(),
            }

            records.push(record);
            continue;
        }

        let Some(record) = records.last_mut() else {
            warn!("Line {}: \"{}\" appears before any record, ignoring", index + 1, line);
            continue;
        };

        if record.kind == RecordKind::Phrase && parts[0] == "melodies" {
            collecting_melodies = true;
            record.melodies = Some(Vec::new());
        } else if collecting_melodies {
            record
                .melodies
                .get_or_insert_with(Vec::new)
                .push(parts.iter().map(|s| s.to_string()).collect());
        } else {
            record
                .attributes
                .insert(parts[0].to_string(), parts[1..].concat());
        }
    }

    records
}

/// Tokenize compressed pattern text such as `C4D4--.E4` into steps.
///
/// Note tokens and the `.`/`-` markers are split apart; anything else is
/// kept as its own token so bad notes surface when they are played. Each
/// `-` is replaced by the token before it, so the result never contains a
/// sustain marker.
pub fn pattern_steps(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut last = 0;

    for found in STEP_TOKEN.find_iter(text) {
        if found.start() > last {
            tokens.push(text[last..found.start()].to_string());
        }
        tokens.push(found.as_str().to_string());
        last = found.end();
    }
    if last < text.len() {
        tokens.push(text[last..].to_string());
    }

    for i in 0..tokens.len() {
        if tokens[i] == SUSTAIN {
            tokens[i] = match i.checked_sub(1) {
                Some(previous) => tokens[previous].clone(),
                None => {
                    warn!("Pattern \"{}\" starts with a sustain, treating it as a rest", text);
                    REST.to_string()
                }
            };
        }
    }

    tokens
}
