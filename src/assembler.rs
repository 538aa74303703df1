//! Turns parsed records into a linked, validated [`Tune`]
//!
//! Instruments and patterns are built first so phrases can resolve their
//! melody lines against them by name. Every cross reference is checked
//! here; a tune that assembles will only fail to render on bad note names.

use crate::error::{PicoError, ReferenceKind, Result};
use crate::instrument::Instrument;
use crate::melody::Melody;
use crate::parser::{Record, RecordKind};
use crate::pattern::Pattern;
use crate::phrase::Phrase;
use crate::tune::Tune;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;
use tracing::{info, warn};

pub fn assemble(records: &[Record]) -> Result<Tune> {
    let instruments = build_instruments(records)?;
    let patterns = build_patterns(records);
    let phrases = build_phrases(records, &instruments, &patterns)?;

    let sequence = single(records, RecordKind::Sequence).ok_or(PicoError::MissingSequence)?;
    for name in &sequence.list {
        if !phrases.contains_key(name) {
            return Err(PicoError::UndefinedPhrase(name.clone()));
        }
    }

    let tune = single(records, RecordKind::Tune)
        .filter(|record| !record.name.is_empty())
        .ok_or(PicoError::MissingTuneName)?;

    info!(
        "Assembled tune \"{}\": {} instruments, {} patterns, {} phrases, sequence of {}",
        tune.name,
        instruments.len(),
        patterns.len(),
        phrases.len(),
        sequence.list.len()
    );

    Ok(Tune::new(tune.name.clone(), sequence.list.clone(), phrases))
}

fn of_kind(records: &[Record], kind: RecordKind) -> impl Iterator<Item = &Record> {
    records.iter().filter(move |record| record.kind == kind)
}

/// First record of `kind`; later ones are reported and ignored
fn single(records: &[Record], kind: RecordKind) -> Option<&Record> {
    let mut matching = of_kind(records, kind);
    let first = matching.next()?;
    for extra in matching {
        warn!(
            "Line {}: extra {} record ignored, using the one on line {}",
            extra.line, kind, first.line
        );
    }
    Some(first)
}

/// Insert keyed by name, keeping the first definition
fn insert_first<T>(map: &mut HashMap<String, T>, kind: RecordKind, record: &Record, value: T) {
    if map.contains_key(&record.name) {
        warn!(
            "Line {}: {} \"{}\" is already defined, keeping the first one",
            record.line, kind, record.name
        );
        return;
    }
    map.insert(record.name.clone(), value);
}

fn enum_attribute<T: FromStr + Default>(record: &Record, attribute: &str) -> Result<T> {
    match record.attribute(attribute) {
        None => Ok(T::default()),
        Some(value) => value.parse().map_err(|_| PicoError::InvalidAttribute {
            record: record.kind.keyword(),
            name: record.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }),
    }
}

fn positive_attribute(record: &Record, attribute: &'static str) -> Result<u32> {
    let value = record
        .attribute(attribute)
        .ok_or_else(|| PicoError::MissingAttribute {
            phrase: record.name.clone(),
            attribute,
        })?;

    value
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| PicoError::InvalidAttribute {
            record: record.kind.keyword(),
            name: record.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

fn build_instruments(records: &[Record]) -> Result<HashMap<String, Rc<Instrument>>> {
    let mut instruments = HashMap::new();

    for record in of_kind(records, RecordKind::Instrument) {
        let instrument = Instrument {
            name: record.name.clone(),
            tone: enum_attribute(record, "tone")?,
            length: enum_attribute(record, "length")?,
            volume: enum_attribute(record, "volume")?,
            pan: enum_attribute(record, "pan")?,
            reverb: enum_attribute(record, "reverb")?,
        };
        insert_first(&mut instruments, RecordKind::Instrument, record, Rc::new(instrument));
    }

    Ok(instruments)
}

fn build_patterns(records: &[Record]) -> HashMap<String, Rc<Pattern>> {
    let mut patterns = HashMap::new();

    for record in of_kind(records, RecordKind::Pattern) {
        let pattern = Pattern::from_tokens(record.name.clone(), &record.list);
        if pattern.is_empty() {
            warn!("Line {}: pattern \"{}\" has no steps", record.line, record.name);
        }
        insert_first(&mut patterns, RecordKind::Pattern, record, Rc::new(pattern));
    }

    patterns
}

fn build_phrases(
    records: &[Record],
    instruments: &HashMap<String, Rc<Instrument>>,
    patterns: &HashMap<String, Rc<Pattern>>,
) -> Result<HashMap<String, Phrase>> {
    let mut phrases = HashMap::new();

    for record in of_kind(records, RecordKind::Phrase) {
        let mut melodies = Vec::new();

        for line in record.melodies.iter().flatten() {
            let [instrument_name, pattern_name] = line.as_slice() else {
                return Err(PicoError::MalformedMelody {
                    phrase: record.name.clone(),
                    line: line.join(" "),
                });
            };

            let instrument = instruments.get(instrument_name).ok_or_else(|| PicoError::Reference {
                phrase: record.name.clone(),
                kind: ReferenceKind::Instrument,
                name: instrument_name.clone(),
            })?;
            let pattern = patterns.get(pattern_name).ok_or_else(|| PicoError::Reference {
                phrase: record.name.clone(),
                kind: ReferenceKind::Pattern,
                name: pattern_name.clone(),
            })?;

            melodies.push(Melody::new(Rc::clone(instrument), Rc::clone(pattern)));
        }

        let phrase = Phrase::new(
            record.name.clone(),
            positive_attribute(record, "tempo")?,
            positive_attribute(record, "beats")?,
            positive_attribute(record, "subbeats")?,
            melodies,
        );
        phrase.validate()?;

        insert_first(&mut phrases, RecordKind::Phrase, record, phrase);
    }

    Ok(phrases)
}
