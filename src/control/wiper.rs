// Wall-following state machine
//
// FOLLOWING: motors drive forward and the sensor is polled once per cycle.
// RECOVERING: the wall was lost; stop, back up, turn clockwise, resume.
// STOPPED: terminal, entered on a termination request or a fatal error.
//
// Cancellation is observed at the poll boundary and after each recovery
// dwell. A maneuver already in progress always runs to its next checkpoint.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{ControlConfig, WiperConfig};
use crate::error::{log_wiper_error, WiperError};
use crate::gpio::OutputLine;
use crate::sensor::RangeSensor;
use crate::timing::Clock;

use super::{calibrate, CalibrationOutcome, CancellationToken, HardwareContext};

/// Control loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiperState {
    Following,
    Recovering,
    Stopped,
}

/// Where the loop was when it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Calibration,
    Following,
    Recovering,
}

/// Why a run ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TerminationRequested { during: Phase },
}

/// Whether a recovery maneuver ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Resumed,
    Cancelled,
}

/// Mutable state of a running loop
#[derive(Debug, Clone, PartialEq)]
pub struct RunningState {
    pub baseline_m: f32,
    pub state: WiperState,
    pub polls: u64,
    pub recoveries: u64,
}

impl RunningState {
    pub fn new(baseline_m: f32) -> Self {
        Self {
            baseline_m,
            state: WiperState::Following,
            polls: 0,
            recoveries: 0,
        }
    }
}

/// Summary of a run that ended cooperatively
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    /// Absent if calibration was interrupted
    pub baseline_m: Option<f32>,
    pub polls: u64,
    pub recoveries: u64,
}

/// Next state for a distance reading taken while following
///
/// Leaves the wall when the deviation from the baseline is strictly greater
/// than the tolerance.
pub fn evaluate(baseline_m: f32, tolerance_m: f32, distance_m: f32) -> WiperState {
    if (distance_m - baseline_m).abs() > tolerance_m {
        WiperState::Recovering
    } else {
        WiperState::Following
    }
}

/// The FOLLOWING/RECOVERING loop over a borrowed hardware context
pub struct WiperLoop<'a, S: RangeSensor, O: OutputLine, C: Clock> {
    hw: &'a mut HardwareContext<S, O>,
    config: &'a ControlConfig,
    clock: &'a C,
    token: &'a CancellationToken,
}

impl<'a, S: RangeSensor, O: OutputLine, C: Clock> WiperLoop<'a, S, O, C> {
    pub fn new(
        hw: &'a mut HardwareContext<S, O>,
        config: &'a ControlConfig,
        clock: &'a C,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            hw,
            config,
            clock,
            token,
        }
    }

    /// Drive forward and follow the wall at `baseline_m` until stopped
    ///
    /// Motors are left in whatever state the last checkpoint issued; the
    /// caller commands stop during cleanup.
    pub fn run(&mut self, baseline_m: f32) -> Result<RunSummary, WiperError> {
        let mut running = RunningState::new(baseline_m);
        let result = self.follow(&mut running);
        running.state = WiperState::Stopped;

        match &result {
            Ok(reason) => info!(
                "[Wiper] Stopped ({:?}) after {} polls, {} recoveries",
                reason, running.polls, running.recoveries
            ),
            Err(err) => log_wiper_error(err, "control loop"),
        }

        result.map(|reason| RunSummary {
            reason,
            baseline_m: Some(baseline_m),
            polls: running.polls,
            recoveries: running.recoveries,
        })
    }

    fn follow(&mut self, running: &mut RunningState) -> Result<StopReason, WiperError> {
        self.hw.motors.forward()?;

        loop {
            let sample = self.hw.sensor.read()?;
            running.polls += 1;
            running.state = evaluate(running.baseline_m, self.config.wall_range_m, sample.distance_m);

            if running.state == WiperState::Recovering {
                info!(
                    "[Wiper] Edge of wall detected at {:.1} cm (baseline {:.1} cm), turning around",
                    sample.distance_cm(),
                    running.baseline_m * 100.0
                );
                running.recoveries += 1;
                if self.recover()? == RecoveryOutcome::Cancelled {
                    return Ok(StopReason::TerminationRequested {
                        during: Phase::Recovering,
                    });
                }
                running.state = WiperState::Following;
            }

            self.clock.delay(self.config.poll_interval());
            if self.token.is_cancelled() {
                return Ok(StopReason::TerminationRequested {
                    during: Phase::Following,
                });
            }
        }
    }

    /// Stop, reverse, turn clockwise, resume forward
    pub fn recover(&mut self) -> Result<RecoveryOutcome, WiperError> {
        let settle = self.config.settle_time();

        self.hw.motors.stop()?;
        self.clock.delay(settle);
        self.hw.motors.backward()?;
        if self.dwell(self.config.reverse_time()) {
            return Ok(RecoveryOutcome::Cancelled);
        }

        self.hw.motors.stop()?;
        self.clock.delay(settle);
        self.hw.motors.turn_cw()?;
        if self.dwell(self.config.turnaround_time()) {
            return Ok(RecoveryOutcome::Cancelled);
        }

        self.hw.motors.stop()?;
        self.clock.delay(settle);
        self.hw.motors.forward()?;
        Ok(RecoveryOutcome::Resumed)
    }

    /// Block for `duration`, then report whether termination was requested
    fn dwell(&self, duration: Duration) -> bool {
        self.clock.delay(duration);
        let cancelled = self.token.is_cancelled();
        if cancelled {
            warn!("[Wiper] Interrupted during recovery maneuver");
        }
        cancelled
    }
}

/// Self-test, calibrate, then follow the wall until stopped
///
/// Hardware is not released here; the caller calls
/// [`HardwareContext::shutdown`] on every path.
pub fn run_wiper<S, O, C>(
    hw: &mut HardwareContext<S, O>,
    config: &WiperConfig,
    clock: &C,
    token: &CancellationToken,
) -> Result<RunSummary, WiperError>
where
    S: RangeSensor,
    O: OutputLine,
    C: Clock,
{
    config.validate()?;

    if config.control.motor_self_test {
        hw.motors
            .self_test(clock, config.control.settle_time())
            .map_err(|err| WiperError::init("motors", err))?;
    }

    let baseline_m = match calibrate(&mut hw.sensor, clock, token, &config.calibration)? {
        CalibrationOutcome::Baseline(baseline_m) => baseline_m,
        CalibrationOutcome::Cancelled { .. } => {
            return Ok(RunSummary {
                reason: StopReason::TerminationRequested {
                    during: Phase::Calibration,
                },
                baseline_m: None,
                polls: 0,
                recoveries: 0,
            });
        }
    };

    WiperLoop::new(hw, &config.control, clock, token).run(baseline_m)
}
