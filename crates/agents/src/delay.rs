use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Artificial wait standing in for speech and model latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingDelay {
    pub base: Duration,
    pub jitter: Duration,
}

impl ProcessingDelay {
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub const fn fixed(base: Duration) -> Self {
        Self::new(base, Duration::ZERO)
    }

    /// Chat replies: 800 ms plus up to 1.2 s.
    pub const fn chat() -> Self {
        Self::new(Duration::from_millis(800), Duration::from_millis(1200))
    }

    /// Transaction processing step.
    pub const fn transaction() -> Self {
        Self::fixed(Duration::from_millis(2000))
    }

    pub fn sample(&self) -> Duration {
        let jitter_millis = self.jitter.as_millis() as u64;
        if jitter_millis == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rand::rng().random_range(0..=jitter_millis))
    }

    pub fn max(&self) -> Duration {
        self.base + self.jitter
    }
}

impl Default for ProcessingDelay {
    fn default() -> Self {
        Self::chat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_within_bounds() {
        let delay = ProcessingDelay::chat();
        for _ in 0..50 {
            let sample = delay.sample();
            assert!(sample >= delay.base);
            assert!(sample <= delay.max());
        }
        assert_eq!(ProcessingDelay::none().sample(), Duration::ZERO);
    }
}
