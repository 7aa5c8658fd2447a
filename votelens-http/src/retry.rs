use rand::Rng;
use std::time::Duration;

/// Bounded exponential backoff with optional jitter.
///
/// Retry number `n` (1-based) waits `base_delay * 2^(n-1)`, capped at
/// `max_delay`. With jitter on, the wait is drawn uniformly from the upper
/// half of that window so concurrent callers spread out.
///
/// ```
/// use std::time::Duration;
/// use votelens_http::RetryPolicy;
///
/// let policy = RetryPolicy {
///     jitter: false,
///     ..RetryPolicy::default()
/// };
/// assert_eq!(policy.delay(1), Duration::from_millis(200));
/// assert_eq!(policy.delay(3), Duration::from_millis(800));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// Upper bound of the wait before retry number `attempt`.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(20) as u32;
        let base_ms = self.base_delay.as_millis() as u64;
        let ms = base_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(ms).min(self.max_delay)
    }

    /// Actual wait before retry number `attempt`.
    pub fn delay(&self, attempt: usize) -> Duration {
        let ceiling = self.backoff(attempt);
        if !self.jitter {
            return ceiling;
        }
        let ceiling_ms = ceiling.as_millis() as u64;
        let half = ceiling_ms / 2;
        let jittered = half + rand::thread_rng().gen_range(0..=ceiling_ms - half);
        Duration::from_millis(jittered)
    }
}
