//! Phrase synthesis
//!
//! A phrase is one measure: `beats × subbeats` steps at a fixed tempo. Each
//! melody is rendered step by step into the measure's buffer. A note always
//! finishes the waveform cycle it is in, even past the end of its step, and
//! when the very next step also sounds, that step picks up where the overrun
//! stopped instead of starting over at its own origin.
//!
//! Instruments with reverb are rendered into a scratch buffer first so the
//! delayed tap only echoes that melody, then merged into the phrase.

use crate::error::{PicoError, Result};
use crate::instrument::SAMPLE_RATE;
use crate::melody::Melody;
use crate::pattern::Step;
use crate::sample::{mix_into, Sample};
use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Phrase {
    pub name: String,
    /// Beats per minute
    pub tempo: u32,
    pub beats: u32,
    pub subbeats: u32,
    pub melodies: Vec<Melody>,
}

impl Phrase {
    pub fn new(
        name: impl Into<String>,
        tempo: u32,
        beats: u32,
        subbeats: u32,
        melodies: Vec<Melody>,
    ) -> Self {
        Self {
            name: name.into(),
            tempo,
            beats,
            subbeats,
            melodies,
        }
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo as f64
    }

    pub fn seconds_per_measure(&self) -> f64 {
        self.seconds_per_beat() * self.beats as f64
    }

    /// Length of the measure in samples.
    ///
    /// Only meaningful for a non-zero tempo; [`Phrase::validate`] rejects
    /// phrases where it is not.
    pub fn buffer_size(&self) -> usize {
        (self.seconds_per_measure() * SAMPLE_RATE as f64).round() as usize
    }

    /// Number of steps every pattern in this phrase must have
    pub fn step_count(&self) -> usize {
        self.beats as usize * self.subbeats as usize
    }

    /// Length of one step in samples (rounded up)
    pub fn step_size(&self) -> usize {
        (self.buffer_size() as f64 / self.step_count() as f64).ceil() as usize
    }

    /// Synthesize the measure. The result is always `buffer_size()` long.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Sample>> {
        self.validate()?;
        let size = self.buffer_size();
        let mut samples = vec![Sample::silent(); size];

        debug!(
            "Rendering phrase \"{}\": {} samples, {} melodies",
            self.name,
            size,
            self.melodies.len()
        );

        for melody in &self.melodies {
            let reverb = melody.instrument.reverb;

            if reverb.is_enabled() {
                let mut scratch = vec![Sample::silent(); size];
                self.render_melody(melody, &mut scratch, rng)?;
                apply_reverb(&mut scratch, reverb.offset(), reverb.decay());
                mix_into(&mut samples, &scratch, 0);
            } else {
                self.render_melody(melody, &mut samples, rng)?;
            }
        }

        Ok(samples)
    }

    /// Check the timing attributes are non-zero and every melody's pattern
    /// fits this phrase's step grid
    pub fn validate(&self) -> Result<()> {
        for (attribute, value) in [
            ("tempo", self.tempo),
            ("beats", self.beats),
            ("subbeats", self.subbeats),
        ] {
            if value == 0 {
                return Err(PicoError::InvalidAttribute {
                    record: "phrase",
                    name: self.name.clone(),
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                });
            }
        }

        self.melodies.iter().try_for_each(|melody| self.check_steps(melody))
    }

    fn check_steps(&self, melody: &Melody) -> Result<()> {
        let steps = melody.pattern.len();
        if steps != self.step_count() {
            return Err(PicoError::StepCountMismatch {
                pattern: melody.pattern.name.clone(),
                steps,
                phrase: self.name.clone(),
                beats: self.beats as usize,
                subbeats: self.subbeats as usize,
            });
        }
        Ok(())
    }

    /// Additively write one melody's steps into `target`
    fn render_melody<R: Rng + ?Sized>(
        &self,
        melody: &Melody,
        target: &mut [Sample],
        rng: &mut R,
    ) -> Result<()> {
        if melody.pattern.is_silent() {
            debug!("  melody {} / {}: all rests", melody.instrument.name, melody.pattern.name);
            return Ok(());
        }

        let instrument = &melody.instrument;
        let step_size = self.step_size();
        let length_offset = (1.0 - instrument.length.value()) * step_size as f64;
        let note_end = step_size as f64 - length_offset;

        debug!(
            "  melody {} / {}: step {} samples, sounding {:.1}",
            instrument.name, melody.pattern.name, step_size, note_end
        );

        // Samples already written into the current step's span by earlier
        // steps. Non-zero only when the immediately preceding step sounded.
        let mut carry_over = 0usize;

        for (number, step) in melody.pattern.steps.iter().enumerate() {
            let note = match step {
                Step::Rest => {
                    carry_over = 0;
                    continue;
                }
                Step::Note(note) => note,
            };

            let oscillator = instrument.oscillator(note)?;
            let start = number * step_size;
            let resume = carry_over;
            let mut local_index = resume;
            let mut wave_index = 0usize;
            carry_over = 0;

            while (local_index as f64) < note_end || wave_index != 0 {
                if let Some(slot) = target.get_mut(start + local_index) {
                    slot.add(instrument.wave_with(&oscillator, wave_index, rng));
                }

                if local_index >= step_size {
                    carry_over += 1;
                }

                local_index += 1;
                wave_index += 1;
                if wave_index >= oscillator.cycle_length() {
                    wave_index = 0;
                }
            }

            // A cycle longer than a step can cover this whole step; the
            // next one resumes after whatever is left of it.
            if local_index == resume {
                carry_over = resume.saturating_sub(step_size);
            }
        }

        Ok(())
    }
}

/// Add one copy of `buffer`, delayed by `offset` samples and scaled by
/// `decay`, back onto itself.
///
/// This is a single tap: the echo is never echoed again.
pub fn apply_reverb(buffer: &mut [Sample], offset: usize, decay: f64) {
    if offset == 0 || offset >= buffer.len() {
        return;
    }

    // Walk backwards so every source sample is read before it receives its
    // own echo.
    for i in (0..buffer.len() - offset).rev() {
        let echo = buffer[i] * decay;
        buffer[i + offset].add(echo);
    }
}
