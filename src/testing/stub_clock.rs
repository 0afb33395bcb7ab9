use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::control::CancellationToken;
use crate::timing::Clock;

struct CancelHook {
    duration: Duration,
    occurrence: usize,
    seen: usize,
    token: CancellationToken,
}

struct StubClockState {
    offset: Duration,
    delays: Vec<Duration>,
    hooks: Vec<CancelHook>,
}

/// Deterministic clock for tests.
///
/// Each call to `now()` advances by a fixed step, and each `delay()` advances
/// by its duration without sleeping, so timestamps stay monotonic and echo
/// timing is reproducible.
pub struct StubClock {
    start: Instant,
    step: Duration,
    state: Mutex<StubClockState>,
}

impl StubClock {
    pub fn new(step: Duration) -> Self {
        Self {
            start: Instant::now(),
            step,
            state: Mutex::new(StubClockState {
                offset: Duration::ZERO,
                delays: Vec::new(),
                hooks: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StubClockState> {
        self.state.lock().expect("stub clock state poisoned")
    }

    /// Cancel `token` during the `occurrence`-th delay (1-based) of exactly `duration`.
    pub fn cancel_on_delay(&self, duration: Duration, occurrence: usize, token: &CancellationToken) {
        self.state().hooks.push(CancelHook {
            duration,
            occurrence,
            seen: 0,
            token: token.clone(),
        });
    }

    /// Every delay requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.state().delays.clone()
    }

    pub fn total_delayed(&self) -> Duration {
        self.state().delays.iter().sum()
    }
}

impl Clock for StubClock {
    fn now(&self) -> Instant {
        let mut state = self.state();
        let now = self.start + state.offset;
        state.offset += self.step;
        now
    }

    fn delay(&self, duration: Duration) {
        let mut state = self.state();
        state.offset += duration;
        state.delays.push(duration);
        for hook in state.hooks.iter_mut().filter(|hook| hook.duration == duration) {
            hook.seen += 1;
            if hook.seen == hook.occurrence {
                hook.token.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_advances_by_step() {
        let clock = StubClock::new(Duration::from_micros(100));
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b.duration_since(a), Duration::from_micros(100));
    }

    #[test]
    fn test_delay_advances_without_sleeping() {
        let clock = StubClock::new(Duration::ZERO);
        let a = clock.now();
        clock.delay(Duration::from_secs(3600));
        assert_eq!(clock.now().duration_since(a), Duration::from_secs(3600));
        assert_eq!(clock.delays(), vec![Duration::from_secs(3600)]);
    }

    #[test]
    fn test_cancel_hook_fires_on_nth_matching_delay() {
        let clock = StubClock::new(Duration::ZERO);
        let token = CancellationToken::new();
        clock.cancel_on_delay(Duration::from_millis(100), 2, &token);

        clock.delay(Duration::from_millis(100));
        clock.delay(Duration::from_millis(50));
        assert!(!token.is_cancelled());

        clock.delay(Duration::from_millis(100));
        assert!(token.is_cancelled());
    }
}
