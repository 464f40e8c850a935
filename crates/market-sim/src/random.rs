//! Random draws for the series generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn unit(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}

/// Draws from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Draws are clamped into `[0, 1)`. An empty script always yields 0.5.
    pub fn new(draws: Vec<f64>) -> Self {
        let draws = draws
            .into_iter()
            .map(|d| d.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { draws, cursor: 0 }
    }

    /// Every draw is the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    pub fn draws_taken(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            self.cursor += 1;
            return 0.5;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value
    }
}
