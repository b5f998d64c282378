use std::cmp;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// In-memory fixed-window request counter keyed by client identifier.
///
/// Single-process by design; counts reset when the window elapses, and a
/// periodic sweep evicts idle keys. A limit of 0 disables the check.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Record one request for `key`. Returns seconds until retry is allowed
    /// when the window is exhausted.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        if self.limit == 0 {
            return Ok(()); // Rate limiting disabled
        }

        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            let remaining = self.window - now.duration_since(entry.started);
            return Err(cmp::max(remaining.as_secs(), 1));
        }

        entry.count += 1;
        Ok(())
    }

    /// Evict windows that have fully elapsed.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// Run the periodic sweep in the background.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            limiter.sweep();
        }
    });
}
