// Reconnect policy - how long to wait before reopening a dropped connection
use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// Same delay every time, retrying forever
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: None,
        }
    }

    pub fn exponential(delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            delay,
            multiplier: if multiplier.is_finite() { multiplier.max(1.0) } else { 1.0 },
            max_delay: max_delay.max(delay),
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before reconnect number `attempt` (1-based, counted since the
    /// last successful open). `None` once the attempt budget is spent.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.delay.as_secs_f64() * self.multiplier.powi(exponent);
        let delay = if scaled.is_finite() && scaled < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(scaled)
        } else {
            self.max_delay
        };
        Some(delay)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}
