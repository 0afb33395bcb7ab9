// GPIO line error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// GPIO error code constants
///
/// Error code range: 1001-1003
pub struct GpioErrorCodes {}

impl GpioErrorCodes {
    /// Chip could not be opened or line could not be requested
    pub const REQUEST_FAILED: i32 = 1001;

    /// Setting an output line value failed
    pub const WRITE_FAILED: i32 = 1002;

    /// Reading an input line value failed
    pub const READ_FAILED: i32 = 1003;
}

/// Log a GPIO error with structured context
pub fn log_gpio_error(err: &GpioError, context: &str) {
    error!(
        "GPIO error in {}: code={}, component=LineIo, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// GPIO line errors
///
/// These errors cover requesting, driving, and reading individual lines
/// of a GPIO character device.
#[derive(Debug, Clone, PartialEq)]
pub enum GpioError {
    /// Opening the chip or requesting the line failed
    RequestFailed {
        chip: String,
        offset: u32,
        reason: String,
    },

    /// Setting the line value failed
    WriteFailed { offset: u32, reason: String },

    /// Reading the line value failed
    ReadFailed { offset: u32, reason: String },
}

impl GpioError {
    /// Offset of the line the error refers to
    pub fn offset(&self) -> u32 {
        match self {
            GpioError::RequestFailed { offset, .. }
            | GpioError::WriteFailed { offset, .. }
            | GpioError::ReadFailed { offset, .. } => *offset,
        }
    }
}

impl ErrorCode for GpioError {
    fn code(&self) -> i32 {
        match self {
            GpioError::RequestFailed { .. } => GpioErrorCodes::REQUEST_FAILED,
            GpioError::WriteFailed { .. } => GpioErrorCodes::WRITE_FAILED,
            GpioError::ReadFailed { .. } => GpioErrorCodes::READ_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            GpioError::RequestFailed {
                chip,
                offset,
                reason,
            } => format!("Failed to request line {} on {}: {}", offset, chip, reason),
            GpioError::WriteFailed { offset, reason } => {
                format!("Failed to set line {}: {}", offset, reason)
            }
            GpioError::ReadFailed { offset, reason } => {
                format!("Failed to read line {}: {}", offset, reason)
            }
        }
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for GpioError {}
