//! A melody plays one pattern on one instrument

use crate::instrument::Instrument;
use crate::pattern::Pattern;
use std::rc::Rc;

/// Instruments and patterns are shared between every phrase that uses them.
#[derive(Debug, Clone)]
pub struct Melody {
    pub instrument: Rc<Instrument>,
    pub pattern: Rc<Pattern>,
}

impl Melody {
    pub fn new(instrument: Rc<Instrument>, pattern: Rc<Pattern>) -> Self {
        Self {
            instrument,
            pattern,
        }
    }
}
