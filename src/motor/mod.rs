// Motor actuator - two DC motors on four GPIO lines
//
// Each side of the chassis is driven by a complementary pair of lines into an
// H-bridge. A command always writes all four lines, in the order right-1,
// right-2, left-1, left-2. Commands are open loop: once the writes return,
// the maneuver is assumed to be in effect.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::GpioConfig;
use crate::error::GpioError;
use crate::gpio::{LineProvider, LineValue, OutputLine};
use crate::timing::Clock;

const ACTIVE: LineValue = LineValue::Active;
const INACTIVE: LineValue = LineValue::Inactive;

/// Consumer label attached to every motor line request
pub const MOTOR_CONSUMER: &str = "motor";

/// Drive command for both motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Forward,
    Backward,
    TurnCw,
    TurnCcw,
    Stop,
}

impl MotorCommand {
    pub const ALL: [MotorCommand; 5] = [
        MotorCommand::Forward,
        MotorCommand::Backward,
        MotorCommand::TurnCw,
        MotorCommand::TurnCcw,
        MotorCommand::Stop,
    ];

    /// Line levels for right-1, right-2, left-1, left-2
    pub const fn pattern(self) -> [LineValue; 4] {
        match self {
            MotorCommand::Forward => [INACTIVE, ACTIVE, INACTIVE, ACTIVE],
            MotorCommand::Backward => [ACTIVE, INACTIVE, ACTIVE, INACTIVE],
            MotorCommand::TurnCw => [ACTIVE, INACTIVE, INACTIVE, ACTIVE],
            MotorCommand::TurnCcw => [INACTIVE, ACTIVE, ACTIVE, INACTIVE],
            MotorCommand::Stop => [INACTIVE, INACTIVE, INACTIVE, INACTIVE],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MotorCommand::Forward => "FORWARD",
            MotorCommand::Backward => "BACKWARD",
            MotorCommand::TurnCw => "TURN-CW",
            MotorCommand::TurnCcw => "TURN-CCW",
            MotorCommand::Stop => "STOP",
        }
    }
}

/// Exclusively owned handle to the four motor lines
///
/// Dropping an unreleased `Motors` commands stop (best effort) before the
/// lines are released, so partial initialization and early returns never
/// leave the chassis driving.
pub struct Motors<O: OutputLine> {
    /// right-1, right-2, left-1, left-2
    lines: [O; 4],
    last: MotorCommand,
    released: bool,
}

impl<O: OutputLine> Motors<O> {
    /// Wrap four already-requested lines, all assumed inactive
    pub fn new(lines: [O; 4]) -> Self {
        Self {
            lines,
            last: MotorCommand::Stop,
            released: false,
        }
    }

    /// Request the four motor lines, initially inactive
    ///
    /// # Errors
    /// The first failed request. Lines acquired before it are released.
    pub fn init<P>(provider: &P, gpio: &GpioConfig) -> Result<Self, GpioError>
    where
        P: LineProvider<Output = O>,
    {
        let right1 = provider.request_output_line(gpio.motor_right_1, INACTIVE, MOTOR_CONSUMER)?;
        let right2 = provider.request_output_line(gpio.motor_right_2, INACTIVE, MOTOR_CONSUMER)?;
        let left1 = provider.request_output_line(gpio.motor_left_1, INACTIVE, MOTOR_CONSUMER)?;
        let left2 = provider.request_output_line(gpio.motor_left_2, INACTIVE, MOTOR_CONSUMER)?;

        info!(
            "[Motors] Acquired lines {}/{} (right) {}/{} (left) on {}",
            gpio.motor_right_1,
            gpio.motor_right_2,
            gpio.motor_left_1,
            gpio.motor_left_2,
            provider.chip_path()
        );
        Ok(Self::new([right1, right2, left1, left2]))
    }

    /// Write the command's pattern to all four lines
    ///
    /// Every line is written even if an earlier write fails; the first
    /// failure is returned and [`Motors::last_command`] keeps the previous
    /// command.
    pub fn apply(&mut self, command: MotorCommand) -> Result<(), GpioError> {
        let mut first_err = None;
        for (line, value) in self.lines.iter_mut().zip(command.pattern()) {
            if let Err(err) = line.set_value(value) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => {
                self.last = command;
                debug!("[Motors] {}", command.display_name());
                Ok(())
            }
        }
    }

    pub fn forward(&mut self) -> Result<(), GpioError> {
        self.apply(MotorCommand::Forward)
    }

    pub fn backward(&mut self) -> Result<(), GpioError> {
        self.apply(MotorCommand::Backward)
    }

    pub fn turn_cw(&mut self) -> Result<(), GpioError> {
        self.apply(MotorCommand::TurnCw)
    }

    pub fn turn_ccw(&mut self) -> Result<(), GpioError> {
        self.apply(MotorCommand::TurnCcw)
    }

    pub fn stop(&mut self) -> Result<(), GpioError> {
        self.apply(MotorCommand::Stop)
    }

    /// Last command whose four writes all succeeded
    pub fn last_command(&self) -> MotorCommand {
        self.last
    }

    /// Briefly pulse forward and backward to confirm the drivers respond
    pub fn self_test<C: Clock>(&mut self, clock: &C, settle: Duration) -> Result<(), GpioError> {
        info!("[Motors] Testing motors...");
        self.forward()?;
        clock.delay(settle);
        self.stop()?;
        clock.delay(settle);
        self.backward()?;
        clock.delay(settle);
        self.stop()
    }

    /// Release the lines without writing to them
    ///
    /// Callers command [`Motors::stop`] first.
    pub fn release(mut self) {
        self.released = true;
        info!("[Motors] Releasing motor lines");
    }
}

impl<O: OutputLine> Drop for Motors<O> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.stop() {
            warn!("[Motors] Stop on drop failed: {}", err);
        }
    }
}
