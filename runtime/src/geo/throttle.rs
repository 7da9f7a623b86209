//! Lookup throttle: caps lookups in flight and spaces out request starts.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Limits how hard a run leans on the geolocation service.
pub struct LookupThrottle {
    semaphore: Arc<Semaphore>,
    max_in_flight: usize,
    min_delay: Duration,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl LookupThrottle {
    /// Create a throttle.
    ///
    /// - `max_in_flight`: lookups allowed at once (clamped to
    ///   `1..=Semaphore::MAX_PERMITS`)
    /// - `min_delay`: minimum time between the start of two lookups
    pub fn new(max_in_flight: usize, min_delay: Duration) -> Self {
        let max_in_flight = max_in_flight.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            min_delay,
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    /// One lookup at a time, no delay.
    pub fn sequential() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Wait for a slot. The slot is released when the guard drops.
    pub async fn acquire(&self) -> ThrottleGuard {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("throttle semaphore is never closed");

        {
            let mut last = self.last_request.lock().await;
            if let Some(prev) = *last {
                let elapsed = prev.elapsed();
                if elapsed < self.min_delay {
                    tokio::time::sleep(self.min_delay - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        ThrottleGuard { _permit: permit }
    }
}

impl Default for LookupThrottle {
    fn default() -> Self {
        Self::sequential()
    }
}

/// Holds a throttle slot until dropped.
pub struct ThrottleGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
