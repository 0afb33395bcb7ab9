// Range sensor error types and constants

use crate::error::{ErrorCode, GpioError};
use log::error;
use std::fmt;

/// Sensor error code constants
///
/// Error code range: 2001-2003
pub struct SensorErrorCodes {}

impl SensorErrorCodes {
    /// Trigger or echo line access failed
    pub const LINE_FAILURE: i32 = 2001;

    /// Echo edge did not arrive within the timeout
    pub const ECHO_TIMEOUT: i32 = 2002;

    /// Sensor has no reading to offer
    pub const UNAVAILABLE: i32 = 2003;
}

/// Log a sensor error with structured context
pub fn log_sensor_error(err: &SensorError, context: &str) {
    error!(
        "Sensor error in {}: code={}, component=RangeSensor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Which echo edge a timeout occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoEdge {
    Rising,
    Falling,
}

/// Range sensor errors
///
/// These errors cover a single blocking measurement: driving the trigger,
/// timing the echo pulse, and reading the echo line.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// Underlying trigger/echo line operation failed
    LineFailure(GpioError),

    /// Echo edge never arrived
    EchoTimeout { edge: EchoEdge, waited_us: u64 },

    /// No reading available (sensor released or source exhausted)
    Unavailable { reason: String },
}

impl ErrorCode for SensorError {
    fn code(&self) -> i32 {
        match self {
            SensorError::LineFailure(_) => SensorErrorCodes::LINE_FAILURE,
            SensorError::EchoTimeout { .. } => SensorErrorCodes::ECHO_TIMEOUT,
            SensorError::Unavailable { .. } => SensorErrorCodes::UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            SensorError::LineFailure(err) => format!("Line failure: {}", err.message()),
            SensorError::EchoTimeout { edge, waited_us } => {
                let edge = match edge {
                    EchoEdge::Rising => "rising",
                    EchoEdge::Falling => "falling",
                };
                format!("No {} echo edge after {} us", edge, waited_us)
            }
            SensorError::Unavailable { reason } => format!("Sensor unavailable: {}", reason),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SensorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SensorError::LineFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GpioError> for SensorError {
    fn from(err: GpioError) -> Self {
        SensorError::LineFailure(err)
    }
}
