use rand::Rng;
use std::time::Duration;

/// Source of the randomized pacing delay applied to admitted actions.
///
/// Injected so tests can substitute a deterministic delay for the uniform
/// jitter used in production.
pub trait DelaySource: Send + Sync {
    fn pacing_delay(&self, min: Duration, max: Duration) -> Duration;
}

/// Uniformly random delay in `[min, max]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformJitter;

impl DelaySource for UniformJitter {
    fn pacing_delay(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let ms = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(ms)
    }
}

/// Fixed delay regardless of the configured window.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelaySource for FixedDelay {
    fn pacing_delay(&self, _min: Duration, _max: Duration) -> Duration {
        self.0
    }
}
