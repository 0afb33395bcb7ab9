// Control loop error types and constants

use crate::error::{ErrorCode, GpioError, SensorError};
use log::error;
use std::fmt;

/// Wiper error code constants
///
/// Error code range: 3001-3004
pub struct WiperErrorCodes {}

impl WiperErrorCodes {
    /// Configuration rejected before touching hardware
    pub const CONFIGURATION: i32 = 3001;

    /// Chip, line, or sensor could not be acquired
    pub const INITIALIZATION_FAILURE: i32 = 3002;

    /// Sensor poll failed while running
    pub const READ_FAILURE: i32 = 3003;

    /// Motor command could not be written while running
    pub const ACTUATOR_FAILURE: i32 = 3004;
}

/// Log a wiper error with structured context
pub fn log_wiper_error(err: &WiperError, context: &str) {
    error!(
        "Wiper error in {}: code={}, component=ControlLoop, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Fatal control loop errors
///
/// Every variant is terminal for the process. Cooperative shutdown is not
/// an error and is reported through [`crate::control::StopReason`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum WiperError {
    /// Invalid configuration constant
    Configuration { reason: String },

    /// Hardware acquisition failed
    InitializationFailure {
        component: &'static str,
        details: String,
    },

    /// Sensor poll failed mid-run
    ReadFailure(SensorError),

    /// Motor line write failed mid-run
    ActuatorFailure(GpioError),
}

impl WiperError {
    pub(crate) fn init(component: &'static str, err: impl ErrorCode) -> Self {
        WiperError::InitializationFailure {
            component,
            details: err.message(),
        }
    }
}

impl ErrorCode for WiperError {
    fn code(&self) -> i32 {
        match self {
            WiperError::Configuration { .. } => WiperErrorCodes::CONFIGURATION,
            WiperError::InitializationFailure { .. } => WiperErrorCodes::INITIALIZATION_FAILURE,
            WiperError::ReadFailure(_) => WiperErrorCodes::READ_FAILURE,
            WiperError::ActuatorFailure(_) => WiperErrorCodes::ACTUATOR_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            WiperError::Configuration { reason } => format!("Invalid configuration: {}", reason),
            WiperError::InitializationFailure { component, details } => {
                format!("Failed to initialize {}: {}", component, details)
            }
            WiperError::ReadFailure(err) => format!("Sensor read failed: {}", err.message()),
            WiperError::ActuatorFailure(err) => {
                format!("Motor command failed: {}", err.message())
            }
        }
    }
}

impl fmt::Display for WiperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WiperError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for WiperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WiperError::ReadFailure(err) => Some(err),
            WiperError::ActuatorFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SensorError> for WiperError {
    fn from(err: SensorError) -> Self {
        WiperError::ReadFailure(err)
    }
}

impl From<GpioError> for WiperError {
    fn from(err: GpioError) -> Self {
        WiperError::ActuatorFailure(err)
    }
}
