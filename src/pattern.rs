//! Rhythmic patterns: one note (or rest) per step

use std::fmt;

/// Step token for silence
pub const REST: &str = ".";

/// Step token meaning "repeat the previous step"
pub const SUSTAIN: &str = "-";

/// A single pattern step
///
/// Note tokens are kept as written; they are resolved to frequencies only
/// when a phrase is synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Rest,
    Note(String),
}

impl Step {
    pub fn from_token(token: &str) -> Self {
        if token == REST {
            Step::Rest
        } else {
            Step::Note(token.to_string())
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Step::Rest)
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Step::Rest => None,
            Step::Note(note) => Some(note),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Rest => write!(f, "{REST}"),
            Step::Note(note) => write!(f, "{note}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Build from already-resolved step tokens (no `-` markers)
    pub fn from_tokens<S: AsRef<str>>(name: impl Into<String>, tokens: &[S]) -> Self {
        let steps = tokens.iter().map(|t| Step::from_token(t.as_ref())).collect();
        Self::new(name, steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when every step is a rest
    pub fn is_silent(&self) -> bool {
        self.steps.iter().all(Step::is_rest)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
