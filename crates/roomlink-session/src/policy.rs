//! Reconnection policy: attempt number → backoff delay.
//!
//! Pure and clock-free. The connection manager asks it two questions after
//! every failure: "may I try again?" and "how long do I wait?".

use std::time::Duration;

use tracing::warn;

/// Smallest base delay accepted; a zero base would turn backoff into a
/// hot loop.
const MIN_BASE_DELAY: Duration = Duration::from_millis(1);

/// Exponential backoff with a delay cap and an attempt ceiling.
///
/// The delay for attempt `n` (1-indexed) is
/// `min(base_delay * 2^(n-1), max_delay)`.
///
/// ```text
/// base=1s, max=10s:  1s, 2s, 4s, 8s, 10s, 10s, ...
/// ```
///
/// Immutable once built: construct with [`ReconnectPolicy::new`] or take
/// the [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Builds a policy, clamping out-of-range values (see
    /// [`validated`](Self::validated)).
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
        .validated()
    }

    /// Clamp and fix any out-of-range values so the policy is safe to use.
    ///
    /// - `base_delay` raised to at least 1 ms.
    /// - `max_delay` raised to at least `base_delay`.
    ///
    /// `max_attempts == 0` is allowed: the first failure is terminal.
    pub fn validated(mut self) -> Self {
        if self.base_delay < MIN_BASE_DELAY {
            warn!(
                base_delay_ms = self.base_delay.as_millis() as u64,
                "base_delay below minimum: clamping"
            );
            self.base_delay = MIN_BASE_DELAY;
        }
        if self.max_delay < self.base_delay {
            warn!(
                max_delay_ms = self.max_delay.as_millis() as u64,
                base_delay_ms = self.base_delay.as_millis() as u64,
                "max_delay below base_delay: raising to base_delay"
            );
            self.max_delay = self.base_delay;
        }
        self
    }

    /// Delay before the first attempt.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Upper bound on any single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Attempt ceiling.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff delay for attempt `attempt` (1-indexed; 0 is treated as 1).
    ///
    /// Saturates at `max_delay` instead of overflowing for large attempts.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Returns `true` once `attempts_made` reached the ceiling.
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        attempts_made >= self.max_attempts
    }

    /// The next attempt number and its delay, or `None` if the ceiling has
    /// been reached.
    pub fn next_attempt(&self, attempts_made: u32) -> Option<(u32, Duration)> {
        if self.is_exhausted(attempts_made) {
            return None;
        }
        let attempt = attempts_made + 1;
        Some((attempt, self.delay_for(attempt)))
    }
}
