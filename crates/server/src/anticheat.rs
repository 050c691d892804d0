//! # Anti-Cheat Evaluation
//!
//! Bounds the claimed hit count by how long the session actually lasted on
//! the server's clock. A human cannot land hits faster than `min_hit_time`
//! apart, so `elapsed / min_hit_time` is the most a session may claim.

use std::time::Duration;

/// Default minimum time between two hits.
pub const DEFAULT_MIN_HIT_TIME: Duration = Duration::from_millis(300);

/// Floor applied to configured values so the bound never divides by zero.
const MIN_HIT_TIME_FLOOR: Duration = Duration::from_millis(1);

/// Configuration for plausibility checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AntiCheatConfig {
    pub min_hit_time: Duration,
}

impl Default for AntiCheatConfig {
    fn default() -> Self {
        Self {
            min_hit_time: DEFAULT_MIN_HIT_TIME,
        }
    }
}

/// Stateless plausibility evaluator.
#[derive(Clone, Copy, Debug)]
pub struct AntiCheat {
    min_hit_secs: f64,
}

impl AntiCheat {
    pub fn new(config: AntiCheatConfig) -> Self {
        Self {
            min_hit_secs: config.min_hit_time.max(MIN_HIT_TIME_FLOOR).as_secs_f64(),
        }
    }

    /// Most hits a session of length `elapsed` can legitimately produce.
    pub fn max_hits(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() / self.min_hit_secs
    }

    pub fn is_plausible(&self, elapsed: Duration, claimed_hits: u64) -> bool {
        claimed_hits as f64 <= self.max_hits(elapsed)
    }
}

impl Default for AntiCheat {
    fn default() -> Self {
        Self::new(AntiCheatConfig::default())
    }
}
