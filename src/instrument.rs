//! Instruments: an oscillator tone plus length, volume, pan and reverb settings
//!
//! Also home to the tuning constants. Frequencies are equal-tempered from a
//! fixed octave-1 table, and every note is rendered at a whole number of
//! samples per cycle.

use crate::error::{PicoError, Result};
use crate::oscillator::{Oscillator, Tone};
use crate::sample::Sample;
use rand::Rng;
use std::collections::HashMap;
use std::str::FromStr;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 11468;

/// Equal-tempered semitone ratio (12th root of 2)
pub const TONE_CONSTANT: f64 = 1.059463;

/// Fixed delay of the reverb tap, in seconds
pub const REVERB_DELAY: f64 = 0.1;

lazy_static::lazy_static! {
    /// Octave-1 base frequencies; sharps and their enharmonic flats share a value
    static ref FREQUENCIES: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert("C", 32.70);
        m.insert("C#", 34.65); m.insert("Db", 34.65);
        m.insert("D", 36.71);
        m.insert("D#", 38.89); m.insert("Eb", 38.89);
        m.insert("E", 41.20);
        m.insert("F", 43.65);
        m.insert("F#", 46.25); m.insert("Gb", 46.25);
        m.insert("G", 49.0);
        m.insert("G#", 51.91); m.insert("Ab", 51.91);
        m.insert("A", 55.00);
        m.insert("A#", 58.27); m.insert("Bb", 58.27);
        m.insert("B", 61.74);
        m
    };
}

/// Frequency in Hz of a note token such as `C4`, `F#2` or `Bb7`
pub fn frequency_for_note(note: &str) -> Result<f64> {
    let mut chars = note.chars();
    let octave_char = chars.next_back();
    let name = chars.as_str();

    let base = FREQUENCIES
        .get(name)
        .copied()
        .ok_or_else(|| PicoError::BadNoteName {
            name: name.to_string(),
            note: note.to_string(),
        })?;

    let octave = octave_char
        .and_then(|c| c.to_digit(10))
        .filter(|o| (1..=8).contains(o))
        .ok_or_else(|| PicoError::BadOctave {
            octave: octave_char.map(String::from).unwrap_or_default(),
            note: note.to_string(),
        })?;

    let octave_shift = TONE_CONSTANT.powi(12);
    Ok((1..octave).fold(base, |freq, _| freq * octave_shift))
}

/// Length of one waveform cycle for `note`, in whole samples
pub fn cycle_length(note: &str) -> Result<usize> {
    let frequency = frequency_for_note(note)?;
    Ok((SAMPLE_RATE as f64 / frequency).ceil() as usize)
}

/// Shared five-step scale used by both note length and volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    None,
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Full,
}

impl Level {
    pub fn value(self) -> f64 {
        match self {
            Level::None => 0.0,
            Level::Quarter => 0.25,
            Level::Half => 0.5,
            Level::ThreeQuarters => 0.75,
            Level::Full => 1.0,
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Level::None),
            "quarter" => Ok(Level::Quarter),
            "half" => Ok(Level::Half),
            "threequarters" => Ok(Level::ThreeQuarters),
            "full" => Ok(Level::Full),
            _ => Err(()),
        }
    }
}

/// Stereo position in five steps from hard left to hard right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pan {
    Left,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    Right,
}

impl Pan {
    pub fn index(self) -> u8 {
        match self {
            Pan::Left => 0,
            Pan::CenterLeft => 1,
            Pan::Center => 2,
            Pan::CenterRight => 3,
            Pan::Right => 4,
        }
    }

    /// (left, right) channel gains
    pub fn gains(self) -> (f64, f64) {
        let position = self.index() as f64 / 4.0;
        (1.0 - position, position)
    }
}

impl FromStr for Pan {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "left" => Ok(Pan::Left),
            "centerleft" => Ok(Pan::CenterLeft),
            "center" => Ok(Pan::Center),
            "centerright" => Ok(Pan::CenterRight),
            "right" => Ok(Pan::Right),
            _ => Err(()),
        }
    }
}

/// Amount of the single delayed reverb tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reverb {
    #[default]
    None,
    Some,
    More,
    Lots,
}

impl Reverb {
    pub fn is_enabled(self) -> bool {
        self != Reverb::None
    }

    /// Gain applied to the delayed copy
    pub fn decay(self) -> f64 {
        match self {
            Reverb::None => 0.0,
            Reverb::Some => 0.25,
            Reverb::More => 0.5,
            Reverb::Lots => 0.75,
        }
    }

    /// Delay of the tap in samples; zero when disabled
    pub fn offset(self) -> usize {
        if self.is_enabled() {
            (SAMPLE_RATE as f64 * REVERB_DELAY).floor() as usize
        } else {
            0
        }
    }
}

impl FromStr for Reverb {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Reverb::None),
            "some" => Ok(Reverb::Some),
            "more" => Ok(Reverb::More),
            "lots" => Ok(Reverb::Lots),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub name: String,
    pub tone: Tone,
    /// Fraction of each step the note sounds for
    pub length: Level,
    pub volume: Level,
    pub pan: Pan,
    pub reverb: Reverb,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone: Tone::default(),
            length: Level::default(),
            volume: Level::default(),
            pan: Pan::default(),
            reverb: Reverb::default(),
        }
    }

    pub fn frequency_for_note(&self, note: &str) -> Result<f64> {
        frequency_for_note(note)
    }

    pub fn cycle_length(&self, note: &str) -> Result<usize> {
        cycle_length(note)
    }

    /// Panned, volume-scaled frame at `wave_index` samples into a cycle of `note`
    pub fn wave<R: Rng + ?Sized>(&self, wave_index: usize, note: &str, rng: &mut R) -> Result<Sample> {
        let oscillator = self.oscillator(note)?;
        Ok(self.wave_with(&oscillator, wave_index, rng))
    }

    /// Oscillator tuned to `note`, resolved once per step by the phrase renderer
    pub fn oscillator(&self, note: &str) -> Result<Oscillator> {
        Ok(Oscillator::new(self.tone, self.cycle_length(note)?))
    }

    pub fn wave_with<R: Rng + ?Sized>(
        &self,
        oscillator: &Oscillator,
        wave_index: usize,
        rng: &mut R,
    ) -> Sample {
        let value = oscillator.sample(wave_index, rng);
        let (left, right) = self.pan.gains();
        let volume = self.volume.value();
        Sample::new(value * volume * left, value * volume * right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_frequency_octave_one() {
        assert_eq!(frequency_for_note("A1").unwrap(), 55.0);
        assert_eq!(frequency_for_note("C1").unwrap(), 32.70);
    }

    #[test]
    fn test_frequency_doubles_per_octave() {
        for octave in 1..8 {
            let lower = frequency_for_note(&format!("C{octave}")).unwrap();
            let upper = frequency_for_note(&format!("C{}", octave + 1)).unwrap();
            assert!(
                (upper / lower - 2.0).abs() < 1e-4,
                "C{octave} -> C{}: ratio {}",
                octave + 1,
                upper / lower
            );
        }
    }

    #[test]
    fn test_enharmonic_equivalence() {
        assert_eq!(
            frequency_for_note("C#4").unwrap(),
            frequency_for_note("Db4").unwrap()
        );
        assert_eq!(
            frequency_for_note("A#2").unwrap(),
            frequency_for_note("Bb2").unwrap()
        );
    }

    #[test]
    fn test_bad_note_name() {
        match frequency_for_note("H4") {
            Err(PicoError::BadNoteName { name, note }) => {
                assert_eq!(name, "H");
                assert_eq!(note, "H4");
            }
            other => panic!("expected BadNoteName, got {other:?}"),
        }
        assert!(matches!(
            frequency_for_note("E#4"),
            Err(PicoError::BadNoteName { .. })
        ));
    }

    #[test]
    fn test_bad_octave() {
        assert!(matches!(
            frequency_for_note("C9"),
            Err(PicoError::BadOctave { .. })
        ));
        assert!(matches!(
            frequency_for_note("C0"),
            Err(PicoError::BadOctave { .. })
        ));
    }

    #[test]
    fn test_cycle_length_rounds_up() {
        // 11468 / 55.0 = 208.5
        assert_eq!(cycle_length("A1").unwrap(), 209);
    }

    #[test]
    fn test_pan_gains() {
        assert_eq!(Pan::Left.gains(), (1.0, 0.0));
        assert_eq!(Pan::Center.gains(), (0.5, 0.5));
        assert_eq!(Pan::CenterRight.gains(), (0.25, 0.75));
        assert_eq!(Pan::Right.gains(), (0.0, 1.0));
    }

    #[test]
    fn test_reverb_settings() {
        assert!(!Reverb::None.is_enabled());
        assert_eq!(Reverb::None.offset(), 0);
        assert_eq!(Reverb::Some.offset(), 1146);
        assert_eq!(Reverb::Lots.decay(), 0.75);
    }

    #[test]
    fn test_wave_applies_volume_and_pan() {
        let mut instrument = Instrument::new("lead");
        instrument.tone = Tone::Square;
        instrument.volume = Level::Half;
        instrument.pan = Pan::Left;

        let mut rng = StdRng::seed_from_u64(1);
        let sample = instrument.wave(0, "C4", &mut rng).unwrap();
        assert!((sample.left - 0.125).abs() < 1e-12);
        assert_eq!(sample.right, 0.0);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("threequarters".parse::<Level>(), Ok(Level::ThreeQuarters));
        assert!("most".parse::<Level>().is_err());
        assert_eq!("centerleft".parse::<Pan>(), Ok(Pan::CenterLeft));
        assert_eq!("lots".parse::<Reverb>(), Ok(Reverb::Lots));
    }
}
