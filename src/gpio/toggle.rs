//! Request a line, toggle it on a fixed period, release it.
//!
//! This is the one parameterized form of the board bring-up blink tests:
//! it backs the `gpio-toggle` binary and is exercised against the fake chip
//! in tests.

use std::time::Duration;

use crate::control::CancellationToken;
use crate::error::GpioError;
use crate::timing::Clock;

use super::{LineProvider, LineValue, OutputLine};

/// Parameters for a toggle run.
#[derive(Debug, Clone)]
pub struct ToggleSpec {
    pub offset: u32,
    pub initial: LineValue,
    pub period: Duration,
    /// Number of toggles before stopping; `None` runs until cancelled.
    pub count: Option<u64>,
    pub consumer: String,
}

impl ToggleSpec {
    pub fn new(offset: u32) -> Self {
        Self {
            offset,
            initial: LineValue::Inactive,
            period: Duration::from_secs(1),
            count: None,
            consumer: "gpio-toggle".to_string(),
        }
    }
}

/// Toggle one output line until `count` toggles are done or `token` is cancelled.
///
/// The line is released when this returns, on every path. Returns the number
/// of toggles written.
pub fn toggle_line<P, C>(
    provider: &P,
    spec: &ToggleSpec,
    clock: &C,
    token: &CancellationToken,
) -> Result<u64, GpioError>
where
    P: LineProvider,
    C: Clock,
{
    let mut line = provider.request_output_line(spec.offset, spec.initial, &spec.consumer)?;
    let mut current = spec.initial;
    let mut toggles = 0u64;

    while spec.count.map_or(true, |count| toggles < count) {
        current = current.toggled();
        line.set_value(current)?;
        toggles += 1;
        tracing::info!("[Toggle] Line {} set to {}", line.offset(), current);

        clock.delay(spec.period);
        if token.is_cancelled() {
            tracing::info!("[Toggle] Cancelled after {} toggles", toggles);
            break;
        }
    }

    Ok(toggles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChip, LineEvent, StubClock};

    #[test]
    fn test_toggle_alternates_and_releases() {
        let chip = FakeChip::new("/dev/gpiochip0");
        let clock = StubClock::new(Duration::from_micros(1));
        let token = CancellationToken::new();
        let spec = ToggleSpec {
            count: Some(3),
            ..ToggleSpec::new(15)
        };

        let toggles = toggle_line(&chip, &spec, &clock, &token).unwrap();

        assert_eq!(toggles, 3);
        assert_eq!(
            chip.writes_for(15),
            vec![LineValue::Active, LineValue::Inactive, LineValue::Active]
        );
        assert!(chip.is_released(15));
        assert_eq!(clock.total_delayed(), Duration::from_secs(3));
        assert_eq!(
            chip.events().first(),
            Some(&LineEvent::RequestedOutput {
                offset: 15,
                initial: LineValue::Inactive,
                consumer: "gpio-toggle".to_string(),
            })
        );
    }

    #[test]
    fn test_cancelled_token_stops_after_first_toggle() {
        let chip = FakeChip::new("/dev/gpiochip0");
        let clock = StubClock::new(Duration::from_micros(1));
        let token = CancellationToken::new();
        token.cancel();

        let toggles = toggle_line(&chip, &ToggleSpec::new(22), &clock, &token).unwrap();

        assert_eq!(toggles, 1);
        assert!(chip.is_released(22));
    }

    #[test]
    fn test_write_failure_releases_line() {
        let chip = FakeChip::new("/dev/gpiochip0");
        chip.fail_writes_on(22);
        let clock = StubClock::new(Duration::from_micros(1));
        let token = CancellationToken::new();

        let result = toggle_line(&chip, &ToggleSpec::new(22), &clock, &token);

        assert!(matches!(result, Err(GpioError::WriteFailed { offset: 22, .. })));
        assert!(chip.is_released(22));
    }
}
