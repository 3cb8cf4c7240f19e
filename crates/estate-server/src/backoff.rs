//! Exponential backoff with jitter for reconnect attempts.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const FACTOR: u32 = 2;

#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    attempt: u32,
    jitter: bool,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.max(Duration::from_millis(1));
        Self {
            min,
            max: max.max(min),
            attempt: 0,
            jitter: true,
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Number of delays handed out so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next attempt: `min * 2^attempt`, capped at `max`.
    pub fn next_delay(&mut self) -> Duration {
        let scale = FACTOR.saturating_pow(self.attempt);
        let delay = self.min.saturating_mul(scale).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        if self.jitter {
            jittered(self.min, delay)
        } else {
            delay
        }
    }
}

/// Pick a delay in `[min, delay]`.
fn jittered(min: Duration, delay: Duration) -> Duration {
    let spread = delay.saturating_sub(min).as_millis() as u64;
    if spread == 0 {
        return delay;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    min + Duration::from_millis(seed % (spread + 1))
}
