//! Per-client fixed-window rate limiting for read endpoints.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::Clock;

/// Windows tracked before stale ones are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started_at: Duration,
}

pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Counts a request from `client`; false once the client exceeded its window budget.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock();

        if windows.len() >= PRUNE_THRESHOLD {
            let span = self.config.window;
            windows.retain(|_, w| now.saturating_sub(w.started_at) < span);
        }

        let window = windows.entry(client).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if now.saturating_sub(window.started_at) >= self.config.window {
            window.count = 0;
            window.started_at = now;
        }

        if window.count >= self.config.max_requests {
            return false;
        }

        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::net::Ipv4Addr;

    #[test]
    fn allows_budget_then_blocks_until_next_window() {
        let clock = Arc::new(ManualClock::at_unix(1));
        let limiter = RateLimiter::new(RateLimitConfig::default(), clock.clone());
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        for _ in 0..5 {
            assert!(limiter.check(client));
        }
        assert!(!limiter.check(client));

        clock.advance(Duration::from_millis(999));
        assert!(!limiter.check(client));

        clock.advance(Duration::from_millis(1));
        assert!(limiter.check(client));
    }

    #[test]
    fn clients_have_independent_budgets() {
        let clock = Arc::new(ManualClock::at_unix(1));
        let limiter = RateLimiter::new(
            RateLimitConfig {
                max_requests: 1,
                window: Duration::from_secs(1),
            },
            clock,
        );
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
    }
}
