//! Monotonic time and blocking delays.

use std::thread;
use std::time::{Duration, Instant};

/// Trait representing a monotonic clock with blocking delays.
///
/// Sensor echo timing reads `now()`; the control loop's dwell times and poll
/// cadence go through `delay()`. Delays are never interrupted.
pub trait Clock {
    fn now(&self) -> Instant;

    fn delay(&self, duration: Duration);

    fn delay_us(&self, us: u64) {
        self.delay(Duration::from_micros(us));
    }

    fn delay_ms(&self, ms: u64) {
        self.delay(Duration::from_millis(ms));
    }
}

/// Default clock backed by `Instant::now` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn delay(&self, duration: Duration) {
        (**self).delay(duration)
    }
}
