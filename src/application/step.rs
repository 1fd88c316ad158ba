// Mean-reverting random walk step
use crate::domain::series::MetricStats;
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// Fraction of the distance to the mean recovered on every step
const REVERSION: f64 = 0.25;

/// Source of uniform samples in `[0, 1)`
pub trait NoiseSource {
    fn next_unit(&mut self) -> f64;
}

/// `NoiseSource` backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngNoise<R>(pub R);

impl RngNoise<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseSource for RngNoise<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Always returns the same sample
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl NoiseSource for ConstantNoise {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Noise shared between a ticker and its timer task
pub type SharedNoise = Arc<Mutex<dyn NoiseSource + Send>>;

pub fn shared_noise<N: NoiseSource + Send + 'static>(noise: N) -> SharedNoise {
    Arc::new(Mutex::new(noise))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Next value of a walk pulled toward `stats.mean`.
///
/// Missing or non-finite `current` restarts the walk at the mean. The result is
/// clamped to `[min - buffer, max + buffer]` and rounded to two decimals.
pub fn mean_reverting_step(
    current: Option<f64>,
    stats: &MetricStats,
    max_step: f64,
    noise: &mut dyn NoiseSource,
) -> f64 {
    let current = current.filter(|v| v.is_finite()).unwrap_or(stats.mean);
    let drift = (stats.mean - current) * REVERSION;
    let jitter = (noise.next_unit() - 0.5) * max_step * 2.0;
    let next = current + drift + jitter;

    let buffer = stats.buffer();
    let clamp_min = stats.min - buffer;
    let clamp_max = stats.max + buffer;
    // f64::clamp panics on NaN bounds
    round2(next.max(clamp_min).min(clamp_max))
}
