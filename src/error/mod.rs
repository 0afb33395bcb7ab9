// Error types for the whiteboard wiper
//
// This module defines the error types for GPIO line access, range sensing,
// and the control loop, each carrying a numeric code so failures can be
// reported uniformly in logs and process exit paths.

mod gpio;
mod sensor;
mod wiper;

pub use gpio::{log_gpio_error, GpioError, GpioErrorCodes};
pub use sensor::{log_sensor_error, EchoEdge, SensorError, SensorErrorCodes};
pub use wiper::{log_wiper_error, WiperError, WiperErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library and the binaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
