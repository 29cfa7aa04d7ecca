//! Injectable randomness for leader selection
//!
//! A source yields unit samples in `[0, 1)`. The scheduler scales the sample by
//! the active set's total voting power.

use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RandomSourceError {
    #[error("Random source unavailable: {0}")]
    Unavailable(String),

    #[error("Random sample {0} is outside [0, 1)")]
    OutOfRange(f64),
}

pub trait RandomSource: Send + Sync {
    /// Next sample in `[0, 1)`
    fn next_unit(&self) -> Result<f64, RandomSourceError>;
}

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        Ok(rand::thread_rng().gen::<f64>())
    }
}

/// Always returns the same sample
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        Ok(self.0)
    }
}

/// Replays a fixed list of samples, then reports itself exhausted
#[derive(Debug, Default)]
pub struct SequenceRandom {
    samples: Mutex<VecDeque<f64>>,
}

impl SequenceRandom {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.lock().len()
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> Result<f64, RandomSourceError> {
        self.samples
            .lock()
            .pop_front()
            .ok_or_else(|| RandomSourceError::Unavailable("sequence exhausted".to_string()))
    }
}

/// Check a sample is usable as a unit draw
pub(crate) fn validate_unit(sample: f64) -> Result<f64, RandomSourceError> {
    if (0.0..1.0).contains(&sample) {
        Ok(sample)
    } else {
        Err(RandomSourceError::OutOfRange(sample))
    }
}
