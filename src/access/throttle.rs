use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::nanos::Nanos;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

type KeyedLimiter<C> = RateLimiter<String, DashMapStateStore<String>, C, StateInformationMiddleware>;

/// Failed-login limiter per key (normalized email).
///
/// Each failure spends one cell of a bucket holding `max_failures` cells
/// that refill evenly over `window`. Once a failure empties the bucket the
/// key is locked out until the next cell refills. Process-local; a restart
/// clears it.
pub struct LoginThrottle<C: Clock = DefaultClock> {
    /// `None` when throttling is disabled
    limiter: Option<KeyedLimiter<C>>,
    clock: C,
    refill: Duration,
    lockouts: DashMap<String, C::Instant>,
}

impl LoginThrottle {
    /// A zero `max_failures` or `window` disables throttling.
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self::with_clock(max_failures, window, DefaultClock::default())
    }
}

impl<C: Clock + Clone> LoginThrottle<C> {
    pub fn with_clock(max_failures: usize, window: Duration, clock: C) -> Self {
        let burst = u32::try_from(max_failures).ok().and_then(NonZeroU32::new);
        let refill = burst.map(|b| window / b.get()).unwrap_or_default();
        let limiter = burst
            .and_then(|b| Quota::with_period(refill).map(|q| q.allow_burst(b)))
            .map(|quota| {
                RateLimiter::dashmap_with_clock(quota, clock.clone())
                    .with_middleware::<StateInformationMiddleware>()
            });

        Self {
            limiter,
            clock,
            refill,
            lockouts: DashMap::new(),
        }
    }

    pub fn is_blocked(&self, key: &str) -> bool {
        let Some(until) = self.lockouts.get(key).map(|u| *u) else {
            return false;
        };
        let now = self.clock.now();
        if until > now {
            return true;
        }
        self.lockouts.remove_if(key, |_, u| *u <= now);
        false
    }

    pub fn record_failure(&self, key: &str) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        let now = self.clock.now();
        let until = match limiter.check_key(&key.to_string()) {
            Ok(snapshot) if snapshot.remaining_burst_capacity() == 0 => now + Nanos::from(self.refill),
            Ok(_) => return,
            Err(not_until) => not_until.earliest_possible(),
        };
        tracing::debug!("Login throttle engaged for {}", key);
        self.lockouts.insert(key.to_string(), until);
    }

    /// Lifts a lockout after a successful login. Spent cells still refill on
    /// their own schedule.
    pub fn clear(&self, key: &str) {
        self.lockouts.remove(key);
    }

    /// Drop keys whose bucket has fully refilled and lockouts that expired.
    pub fn sweep(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
        let now = self.clock.now();
        self.lockouts.retain(|_, until| *until > now);
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.limiter.as_ref().map_or(0, |l| l.len()) + self.lockouts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    fn throttle(max: usize, window_secs: u64) -> (LoginThrottle<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let t = LoginThrottle::with_clock(max, Duration::from_secs(window_secs), clock.clone());
        (t, clock)
    }

    #[test]
    fn test_blocks_after_max_failures() {
        let (t, clock) = throttle(3, 60);
        for _ in 0..2 {
            t.record_failure("a@x.com");
        }
        assert!(!t.is_blocked("a@x.com"));
        t.record_failure("a@x.com");
        assert!(t.is_blocked("a@x.com"));
        assert!(!t.is_blocked("b@x.com"));

        // One cell refills every 20s; the next failure locks again at once
        clock.advance(Duration::from_secs(20));
        assert!(!t.is_blocked("a@x.com"));
        t.record_failure("a@x.com");
        assert!(t.is_blocked("a@x.com"));
    }

    #[test]
    fn test_window_expires() {
        let (t, clock) = throttle(1, 60);
        t.record_failure("a@x.com");
        clock.advance(Duration::from_secs(59));
        assert!(t.is_blocked("a@x.com"));
        clock.advance(Duration::from_secs(1));
        assert!(!t.is_blocked("a@x.com"));
    }

    #[test]
    fn test_clear_and_disabled() {
        let t = LoginThrottle::new(1, Duration::from_secs(60));
        t.record_failure("a@x.com");
        assert!(t.is_blocked("a@x.com"));
        t.clear("a@x.com");
        assert!(!t.is_blocked("a@x.com"));

        let off = LoginThrottle::new(0, Duration::from_secs(60));
        off.record_failure("a@x.com");
        assert!(!off.is_blocked("a@x.com"));

        let no_window = LoginThrottle::new(3, Duration::ZERO);
        for _ in 0..5 {
            no_window.record_failure("a@x.com");
        }
        assert!(!no_window.is_blocked("a@x.com"));
    }

    #[test]
    fn test_sweep_evicts_expired_keys() {
        let (t, clock) = throttle(3, 60);
        for i in 0..10_000 {
            t.record_failure(&format!("user{}@x.com", i));
        }
        assert_eq!(t.tracked_keys(), 10_000);

        clock.advance(Duration::from_secs(3600));
        t.record_failure("late@x.com");
        t.sweep();
        assert_eq!(t.tracked_keys(), 1);
    }

    #[test]
    fn test_sweep_drops_expired_lockouts() {
        let (t, clock) = throttle(1, 60);
        t.record_failure("a@x.com");
        t.sweep();
        assert!(t.is_blocked("a@x.com"));

        clock.advance(Duration::from_secs(61));
        t.sweep();
        assert_eq!(t.tracked_keys(), 0);
    }
}
