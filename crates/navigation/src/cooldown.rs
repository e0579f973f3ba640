//! Per-session cooldown between navigation requests

use std::sync::Mutex;
use std::time::{Duration, Instant};

use storefinder_core::clock::{SharedClock, SystemClock};

/// Default gap between navigation requests.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Minimum spacing between accepted requests.
#[derive(Debug)]
pub struct Cooldown {
    period: Duration,
    last: Mutex<Option<Instant>>,
    clock: SharedClock,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl Cooldown {
    /// Cooldown on the system clock.
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, SystemClock::shared())
    }

    /// Cooldown reading time from `clock`.
    pub fn with_clock(period: Duration, clock: SharedClock) -> Self {
        Self {
            period,
            last: Mutex::new(None),
            clock,
        }
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left before a new request is accepted, `None` if ready.
    pub fn remaining(&self) -> Option<Duration> {
        let last = *self.last.lock().unwrap_or_else(|e| e.into_inner());
        let elapsed = self.clock.now().saturating_duration_since(last?);
        (elapsed < self.period).then(|| self.period - elapsed)
    }

    /// Check and arm in one step.
    ///
    /// Of several concurrent callers inside one period, only one gets a
    /// permit. The others get the time left.
    pub fn try_begin(&self) -> Result<CooldownPermit<'_>, Duration> {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        if let Some(prev) = *last {
            let elapsed = now.saturating_duration_since(prev);
            if elapsed < self.period {
                return Err(self.period - elapsed);
            }
        }
        let previous = last.replace(now);
        Ok(CooldownPermit {
            cooldown: self,
            previous,
            armed_at: now,
        })
    }

    /// Mark a request as accepted now.
    pub fn arm(&self) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(self.clock.now());
    }

    /// Forget the last request.
    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// An accepted request that has already armed the cooldown.
///
/// Dropping the permit keeps the cooldown armed; [`CooldownPermit::release`]
/// undoes it for requests that end up rejected.
#[derive(Debug)]
#[must_use]
pub struct CooldownPermit<'a> {
    cooldown: &'a Cooldown,
    previous: Option<Instant>,
    armed_at: Instant,
}

impl CooldownPermit<'_> {
    /// Restore the state from before this permit, unless something re-armed
    /// or reset the cooldown since.
    pub fn release(self) {
        let mut last = self.cooldown.last.lock().unwrap_or_else(|e| e.into_inner());
        if *last == Some(self.armed_at) {
            *last = self.previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefinder_core::clock::ManualClock;

    #[test]
    fn test_ready_until_armed() {
        let cooldown = Cooldown::default();
        assert_eq!(cooldown.remaining(), None);
        assert_eq!(cooldown.period(), Duration::from_secs(2));
    }

    #[test]
    fn test_remaining_counts_down() {
        let clock = ManualClock::new();
        let cooldown = Cooldown::with_clock(Duration::from_secs(2), clock.shared());

        cooldown.arm();
        assert_eq!(cooldown.remaining(), Some(Duration::from_secs(2)));

        clock.advance(Duration::from_millis(500));
        assert_eq!(cooldown.remaining(), Some(Duration::from_millis(1500)));

        clock.advance(Duration::from_millis(1500));
        assert_eq!(cooldown.remaining(), None);
    }

    #[test]
    fn test_try_begin_arms_once() {
        let clock = ManualClock::new();
        let cooldown = Cooldown::with_clock(Duration::from_secs(2), clock.shared());

        let _permit = cooldown.try_begin().unwrap();
        clock.advance(Duration::from_millis(500));
        assert_eq!(cooldown.try_begin().unwrap_err(), Duration::from_millis(1500));

        clock.advance(Duration::from_millis(1500));
        assert!(cooldown.try_begin().is_ok());
    }

    #[test]
    fn test_release_restores_previous() {
        let clock = ManualClock::new();
        let cooldown = Cooldown::with_clock(Duration::from_secs(2), clock.shared());

        cooldown.try_begin().unwrap().release();
        assert_eq!(cooldown.remaining(), None);

        cooldown.arm();
        clock.advance(Duration::from_secs(3));
        cooldown.try_begin().unwrap().release();
        // Back to the old stamp, which has already run out
        assert_eq!(cooldown.remaining(), None);
    }

    #[test]
    fn test_concurrent_try_begin_admits_one() {
        let cooldown = Cooldown::default();
        let admitted = std::sync::atomic::AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    if cooldown.try_begin().is_ok() {
                        admitted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(admitted.into_inner(), 1);
    }

    #[test]
    fn test_reset() {
        let cooldown = Cooldown::default();
        cooldown.arm();
        assert!(cooldown.remaining().is_some());
        cooldown.reset();
        assert!(cooldown.remaining().is_none());
    }
}
