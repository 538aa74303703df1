//! Stereo sample accumulator with foldback saturation

use std::ops::Mul;

/// A single stereo frame.
///
/// Accumulation goes through [`Sample::add`], which folds overshoot back
/// into range instead of clipping it, so both channels stay within
/// `[-1.0, 1.0]` after every merge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub left: f64,
    pub right: f64,
}

impl Sample {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Same value on both channels
    pub fn mono(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn silent() -> Self {
        Self::default()
    }

    /// Accumulate `other` into this frame, folding each channel back
    /// into range. Returns `self` so merges can be chained.
    pub fn add(&mut self, other: Sample) -> &mut Self {
        self.left = foldback(self.left + other.left);
        self.right = foldback(self.right + other.right);
        self
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.left, self.right]
    }
}

impl Mul<f64> for Sample {
    type Output = Sample;

    fn mul(self, rhs: f64) -> Sample {
        Sample::new(self.left * rhs, self.right * rhs)
    }
}

/// Reflect a value that overshoots ±1.0 back by the amount of overshoot.
///
/// `1.2` becomes `0.8`, `-1.2` becomes `-0.8`; values in range pass through.
/// Overshoot larger than 2.0 keeps reflecting between the two bounds, so
/// the result is always in range for finite input.
pub fn foldback(value: f64) -> f64 {
    // The fold repeats every 4.0; reduce into [-1.0, 3.0) first
    let value = if value.abs() > 3.0 {
        (value + 1.0).rem_euclid(4.0) - 1.0
    } else {
        value
    };

    if value > 1.0 {
        1.0 - (value - 1.0)
    } else if value < -1.0 {
        -1.0 - (value + 1.0)
    } else {
        value
    }
}

/// Overlay `source` onto `target` starting at `offset`, sample by sample.
/// Samples that would land past the end of `target` are dropped.
pub fn mix_into(target: &mut [Sample], source: &[Sample], offset: usize) {
    for (slot, sample) in target.iter_mut().skip(offset).zip(source) {
        slot.add(*sample);
    }
}
