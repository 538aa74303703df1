//! Per-sample waveform generation
//!
//! Oscillators here are stateless: each call maps a position within one
//! waveform cycle to an amplitude. Cycle lengths are whole samples, which
//! is what gives the low sample rate its chiptune grit.

use rand::Rng;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Oscillator tone
///
/// `Sine` is the default for instruments that never set a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    Square,
    #[default]
    Sine,
    Triangle,
    Noise,
    Saw,
}

impl Tone {
    /// Amplitude used when the caller does not supply one
    pub fn default_amplitude(self) -> f64 {
        match self {
            Tone::Square => 0.25,
            Tone::Sine | Tone::Triangle | Tone::Noise | Tone::Saw => 0.5,
        }
    }
}

impl FromStr for Tone {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(Tone::Square),
            "sine" => Ok(Tone::Sine),
            "triangle" => Ok(Tone::Triangle),
            "noise" => Ok(Tone::Noise),
            "saw" => Ok(Tone::Saw),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Square => "square",
            Tone::Sine => "sine",
            Tone::Triangle => "triangle",
            Tone::Noise => "noise",
            Tone::Saw => "saw",
        };
        write!(f, "{name}")
    }
}

/// One cycle's worth of a waveform at a fixed length in samples
#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    tone: Tone,
    cycle_length: usize,
    amplitude: f64,
}

impl Oscillator {
    pub fn new(tone: Tone, cycle_length: usize) -> Self {
        Self {
            tone,
            cycle_length: cycle_length.max(1),
            amplitude: tone.default_amplitude(),
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// Value at `index` samples into the cycle.
    ///
    /// Only `Tone::Noise` draws from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> f64 {
        match self.tone {
            Tone::Square => self.square(index),
            Tone::Sine => self.sine(index),
            Tone::Triangle => self.triangle(index),
            Tone::Noise => self.noise(index, rng),
            Tone::Saw => self.saw(index),
        }
    }

    fn sine(&self, index: usize) -> f64 {
        (index as f64 * 2.0 * PI / self.cycle_length as f64).sin() * self.amplitude
    }

    fn square(&self, index: usize) -> f64 {
        let level = if index <= self.cycle_length / 2 { 1.0 } else { -1.0 };
        level * self.amplitude
    }

    // Two ramps per cycle, each offset by half its own interval.
    fn saw(&self, index: usize) -> f64 {
        let interval = (self.cycle_length / 2).max(1);
        let half_interval = interval / 2;
        let phase = ((index + half_interval) % interval) as f64 / interval as f64;
        ((0.6 * phase) - 0.3) * self.amplitude
    }

    fn triangle(&self, index: usize) -> f64 {
        let half = self.cycle_length / 2;
        let quarter = (self.cycle_length / 4).max(1);
        let ramp = 1.0 / quarter as f64;

        let level = if index <= half {
            if index <= quarter {
                index as f64 * ramp
            } else {
                (half as f64 - index as f64) * ramp
            }
        } else if index <= half + quarter {
            -((index - half) as f64 * ramp)
        } else {
            -((self.cycle_length as f64 - index as f64) * ramp)
        };

        level * self.amplitude
    }

    fn noise<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> f64 {
        let spread: f64 = rng.gen::<f64>() - 0.5;
        self.sine(index) * spread * self.amplitude
    }
}
