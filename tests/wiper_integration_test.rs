// Full runs of the control stack against the fake GPIO chip
//
// The HC-SR04 driver runs unmodified on top of FakeChip, so these tests cover
// the real echo timing, the reflection clamp, and the line request/release
// order together with the control loop.

use std::time::Duration;

use whiteboard_wiper::config::{ControlConfig, WiperConfig};
use whiteboard_wiper::control::{acquire, run_wiper, CancellationToken, Phase, StopReason};
use whiteboard_wiper::error::{EchoEdge, SensorError};
use whiteboard_wiper::gpio::LineValue;
use whiteboard_wiper::testing::{FakeChip, StubClock};
use whiteboard_wiper::WiperError;

const ECHO: u32 = 27;
const MOTOR_LINES: [u32; 4] = [15, 18, 23, 24];
const STEP: Duration = Duration::from_micros(100);
const POLL: Duration = Duration::from_millis(200);

/// Echo levels for one measurement of `width_steps` clock steps
fn echo(width_steps: usize) -> Vec<LineValue> {
    let mut levels = vec![LineValue::Inactive, LineValue::Active];
    levels.extend(std::iter::repeat(LineValue::Active).take(width_steps - 2));
    levels.push(LineValue::Inactive);
    levels
}

fn config() -> WiperConfig {
    WiperConfig {
        control: ControlConfig {
            poll_interval_ms: 200,
            ..ControlConfig::default()
        },
        ..WiperConfig::default()
    }
}

fn assert_all_released(chip: &FakeChip) {
    assert!(chip.held_offsets().is_empty(), "still held: {:?}", chip.held_offsets());
    for offset in MOTOR_LINES {
        assert_eq!(chip.level(offset), Some(LineValue::Inactive), "line {}", offset);
    }
}

#[test]
fn test_calibrate_follow_recover_then_terminate() {
    let chip = FakeChip::new("/dev/gpiochip0");
    let clock = StubClock::new(STEP);
    let token = CancellationToken::new();
    let config = config();

    // 3000 us raw clamps to 2000 us / 0.34 m: ten calibration reads plus one
    // in-range poll. 4000 us clamps to 0.51 m, well outside the band.
    for _ in 0..11 {
        chip.script_input(ECHO, echo(30));
    }
    chip.script_input(ECHO, echo(40));
    clock.cancel_on_delay(POLL, 2, &token);

    let mut hw = acquire(&chip, &config, &clock).unwrap();
    let summary = run_wiper(&mut hw, &config, &clock, &token).unwrap();
    hw.shutdown().unwrap();

    assert_eq!(
        summary.reason,
        StopReason::TerminationRequested {
            during: Phase::Following
        }
    );
    let baseline = summary.baseline_m.unwrap();
    assert!((baseline - 0.34).abs() < 1e-4, "baseline {}", baseline);
    assert_eq!(summary.polls, 2);
    assert_eq!(summary.recoveries, 1);
    assert!(clock.delays().contains(&Duration::from_secs(1)));
    assert_all_released(&chip);
}

#[test]
fn test_lost_echo_is_fatal_and_releases_hardware() {
    let chip = FakeChip::new("/dev/gpiochip0");
    let clock = StubClock::new(STEP);
    let token = CancellationToken::new();
    let config = config();

    for _ in 0..10 {
        chip.script_input(ECHO, echo(30));
    }

    let mut hw = acquire(&chip, &config, &clock).unwrap();
    let result = run_wiper(&mut hw, &config, &clock, &token);
    hw.shutdown().unwrap();

    match result {
        Err(WiperError::ReadFailure(SensorError::EchoTimeout { edge, .. })) => {
            assert_eq!(edge, EchoEdge::Rising)
        }
        other => panic!("expected echo timeout, got {:?}", other),
    }
    assert_all_released(&chip);
}

#[test]
fn test_terminated_during_calibration() {
    let chip = FakeChip::new("/dev/gpiochip0");
    let clock = StubClock::new(STEP);
    let token = CancellationToken::new();
    let config = config();

    for _ in 0..10 {
        chip.script_input(ECHO, echo(30));
    }
    clock.cancel_on_delay(config.calibration.interval(), 3, &token);

    let mut hw = acquire(&chip, &config, &clock).unwrap();
    let summary = run_wiper(&mut hw, &config, &clock, &token).unwrap();
    hw.shutdown().unwrap();

    assert_eq!(
        summary.reason,
        StopReason::TerminationRequested {
            during: Phase::Calibration
        }
    );
    assert_eq!(summary.baseline_m, None);
    assert_all_released(&chip);
}

#[test]
fn test_busy_line_fails_initialization() {
    let chip = FakeChip::new("/dev/gpiochip0");
    let clock = StubClock::new(STEP);
    chip.fail_request_on(ECHO);

    let result = acquire(&chip, &WiperConfig::default(), &clock);

    match result {
        Err(WiperError::InitializationFailure { component, .. }) => assert_eq!(component, "hcsr04"),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("acquire should fail"),
    }
    assert!(chip.held_offsets().is_empty());
}
