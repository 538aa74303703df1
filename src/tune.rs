//! Tunes: a named sequence of phrases
//!
//! Rendering is an explicit step. [`Tune::render`] synthesizes every phrase
//! the sequence uses exactly once and lays the cached buffers end to end.
//! The returned [`RenderedTune`] is immutable, so nothing is ever
//! recomputed behind the caller's back.

use crate::error::{PicoError, Result};
use crate::instrument::SAMPLE_RATE;
use crate::phrase::Phrase;
use crate::sample::{mix_into, Sample};
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Tune {
    pub name: String,
    /// Phrase names in playback order; a phrase may appear many times
    pub sequence: Vec<String>,
    pub phrases: HashMap<String, Phrase>,
}

impl Tune {
    pub fn new(
        name: impl Into<String>,
        sequence: Vec<String>,
        phrases: HashMap<String, Phrase>,
    ) -> Self {
        Self {
            name: name.into(),
            sequence,
            phrases,
        }
    }

    pub fn phrase(&self, name: &str) -> Result<&Phrase> {
        self.phrases
            .get(name)
            .ok_or_else(|| PicoError::UndefinedPhrase(name.to_string()))
    }

    /// Phrases in sequence order, one entry per occurrence
    pub fn sequenced_phrases(&self) -> Result<Vec<&Phrase>> {
        self.sequence.iter().map(|name| self.phrase(name)).collect()
    }

    /// Total length in samples
    pub fn buffer_size(&self) -> Result<usize> {
        Ok(self
            .sequenced_phrases()?
            .iter()
            .map(|phrase| phrase.buffer_size())
            .sum())
    }

    pub fn duration_secs(&self) -> Result<f64> {
        Ok(self.buffer_size()? as f64 / SAMPLE_RATE as f64)
    }

    /// Synthesize the whole tune.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RenderedTune> {
        let mut phrase_buffers: HashMap<String, Vec<Sample>> = HashMap::new();
        for name in &self.sequence {
            if !phrase_buffers.contains_key(name) {
                let buffer = self.phrase(name)?.render(rng)?;
                phrase_buffers.insert(name.clone(), buffer);
            }
        }

        let mut buffer = vec![Sample::silent(); self.buffer_size()?];
        let mut offset = 0;

        for name in &self.sequence {
            let phrase = self.phrase(name)?;
            if let Some(phrase_buffer) = phrase_buffers.get(name) {
                debug!("Placing phrase \"{}\" at sample {}", name, offset);
                mix_into(&mut buffer, phrase_buffer, offset);
            }
            offset += phrase.buffer_size();
        }

        info!(
            "Rendered tune \"{}\": {} phrases, {} samples ({:.2}s)",
            self.name,
            self.sequence.len(),
            buffer.len(),
            buffer.len() as f64 / SAMPLE_RATE as f64
        );

        Ok(RenderedTune {
            name: self.name.clone(),
            phrase_buffers,
            buffer,
        })
    }
}

/// Finished audio for a tune along with the per-phrase buffers it was
/// built from.
#[derive(Debug, Clone)]
pub struct RenderedTune {
    name: String,
    phrase_buffers: HashMap<String, Vec<Sample>>,
    buffer: Vec<Sample>,
}

impl RenderedTune {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    pub fn buffer(&self) -> &[Sample] {
        &self.buffer
    }

    pub fn phrase_buffer(&self, name: &str) -> Option<&[Sample]> {
        self.phrase_buffers.get(name).map(Vec::as_slice)
    }

    pub fn duration_secs(&self) -> f64 {
        self.buffer.len() as f64 / SAMPLE_RATE as f64
    }

    pub fn into_buffer(self) -> Vec<Sample> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Instrument;
    use crate::melody::Melody;
    use crate::oscillator::Tone;
    use crate::pattern::Pattern;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::rc::Rc;

    fn tune(sequence: &[&str]) -> Tune {
        let mut lead = Instrument::new("lead");
        lead.tone = Tone::Square;
        let lead = Rc::new(lead);

        let a = Phrase::new(
            "a",
            120,
            1,
            2,
            vec![Melody::new(lead.clone(), Rc::new(Pattern::from_tokens("pa", &["C4", "."])))],
        );
        let b = Phrase::new(
            "b",
            240,
            2,
            1,
            vec![Melody::new(lead, Rc::new(Pattern::from_tokens("pb", &[".", "G4"])))],
        );

        let phrases = [a, b]
            .into_iter()
            .map(|phrase| (phrase.name.clone(), phrase))
            .collect();
        Tune::new("test", sequence.iter().map(|s| s.to_string()).collect(), phrases)
    }

    #[test]
    fn test_buffer_length_is_sum_of_sequence() {
        let tune = tune(&["a", "b", "a"]);
        let a = tune.phrase("a").unwrap().buffer_size();
        let b = tune.phrase("b").unwrap().buffer_size();
        assert_eq!(a, 5734);
        assert_eq!(b, 5734);

        let rendered = tune.render(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(rendered.name(), "test");
        assert_eq!(rendered.buffer().len(), 2 * a + b);
        assert_eq!(tune.buffer_size().unwrap(), 2 * a + b);
    }

    #[test]
    fn test_phrases_placed_in_order() {
        let tune = tune(&["b", "a"]);
        let rendered = tune.render(&mut StdRng::seed_from_u64(3)).unwrap();
        let a = rendered.phrase_buffer("a").unwrap();
        let b = rendered.phrase_buffer("b").unwrap();

        assert_eq!(&rendered.buffer()[..b.len()], b);
        assert_eq!(&rendered.buffer()[b.len()..], a);
    }

    #[test]
    fn test_repeated_phrase_rendered_once() {
        let tune = tune(&["a", "a"]);
        let rendered = tune.render(&mut StdRng::seed_from_u64(3)).unwrap();
        let a = rendered.phrase_buffer("a").unwrap();
        assert_eq!(&rendered.buffer()[..a.len()], a);
        assert_eq!(&rendered.buffer()[a.len()..], a);
        assert!(rendered.phrase_buffer("b").is_none());
    }

    #[test]
    fn test_undefined_phrase() {
        let tune = tune(&["a", "c"]);
        assert!(matches!(
            tune.render(&mut StdRng::seed_from_u64(3)),
            Err(PicoError::UndefinedPhrase(name)) if name == "c"
        ));
    }
}
