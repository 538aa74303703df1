//! Render configuration
//!
//! Read from `config.toml` in the user's picotune config directory (or an
//! explicit path). Every field is optional:
//!
//! ```toml
//! format = "pcm16"
//! output_dir = "renders"
//! seed = 1234
//! ```

use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Sample encoding of the written WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 8-bit PCM
    #[default]
    Pcm8,
    Pcm16,
    Float32,
}

impl SampleFormat {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            SampleFormat::Pcm8 => 8,
            SampleFormat::Pcm16 => 16,
            SampleFormat::Float32 => 32,
        }
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pcm8" => Ok(SampleFormat::Pcm8),
            "pcm16" => Ok(SampleFormat::Pcm16),
            "float32" => Ok(SampleFormat::Float32),
            _ => Err(format!("unknown sample format \"{s}\" (expected pcm8, pcm16 or float32)")),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::Pcm8 => "pcm8",
            SampleFormat::Pcm16 => "pcm16",
            SampleFormat::Float32 => "float32",
        };
        write!(f, "{name}")
    }
}

/// Configuration for rendering tunes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub format: SampleFormat,
    /// Directory for `<tune name>.wav`; current directory when unset
    pub output_dir: Option<PathBuf>,
    /// Seed for the noise oscillator; system entropy when unset
    pub seed: Option<u64>,
}

impl RenderConfig {
    /// `<config dir>/picotune/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("picotune").join("config.toml"))
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path` if given, else from the default location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = RenderConfig::parse(
            r#"
format = "float32"
output_dir = "out"
seed = 99
"#,
        )
        .unwrap();

        assert_eq!(config.format, SampleFormat::Float32);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = RenderConfig::parse("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.format, SampleFormat::Pcm8);
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(RenderConfig::parse("format = \"mp3\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pcm16".parse::<SampleFormat>(), Ok(SampleFormat::Pcm16));
        assert!("wav".parse::<SampleFormat>().is_err());
        assert_eq!(SampleFormat::Float32.bits_per_sample(), 32);
    }
}
