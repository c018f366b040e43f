//! Global request admission control
//!
//! One limiter is shared by every fetch of a run. It spaces the *starts* of
//! admitted requests at least `1 / requests_per_second` apart, regardless of
//! how many fetch tasks run concurrently.

use crate::ConfigError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Minimum-interval rate limiter safe for concurrent callers
///
/// Waiters queue on a fair (FIFO) async mutex, so no caller starves. The lock
/// is held only for the admission sleep, never while a fetch is in flight.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_admission: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting at most `requests_per_second` calls per second
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the rate is not a positive finite
    /// number, or so small that the interval cannot be represented.
    pub fn new(requests_per_second: f64) -> Result<Self, ConfigError> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "requests_per_second must be a positive number, got {}",
                requests_per_second
            )));
        }

        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second).map_err(|e| {
            ConfigError::Validation(format!(
                "requests_per_second {} gives an unusable interval: {}",
                requests_per_second, e
            ))
        })?;

        Ok(Self::with_interval(interval))
    }

    /// Creates a limiter with an explicit minimum interval
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_admission: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspends until the caller may start a request
    ///
    /// The first call returns immediately. Every later call returns no earlier
    /// than one interval after the previous admission.
    ///
    /// # Returns
    ///
    /// The instant this caller was admitted.
    pub async fn wait(&self) -> Instant {
        let mut last = self.last_admission.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    "Rate limiter holding request for {:?}",
                    ready_at - Instant::now()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let admitted = Instant::now();
        *last = Some(admitted);
        admitted
    }

    /// Like [`RateLimiter::wait`], but gives up when `cancel` fires
    ///
    /// Returns `None` without recording an admission if the token is
    /// cancelled first, so a cancelled waiter never uses up an interval.
    pub async fn wait_unless_cancelled(&self, cancel: &CancellationToken) -> Option<Instant> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            admitted = self.wait() => Some(admitted),
        }
    }
}
