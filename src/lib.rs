// Whiteboard Wiper Core - wall-following robot control
// HC-SR04 range sensor and two DC motors on Linux GPIO character devices

// Module declarations
pub mod config;
pub mod control;
pub mod error;
pub mod gpio;
pub mod motor;
pub mod realtime;
pub mod sensor;
#[cfg(unix)]
pub mod signal;
pub mod testing;
pub mod timing;

pub use config::WiperConfig;
pub use control::{run_wiper, CancellationToken, HardwareContext, RunSummary, StopReason};
pub use error::{ErrorCode, GpioError, SensorError, WiperError};

use tracing::Level;

/// Install the fmt subscriber for binaries
///
/// Also bridges `log` records into tracing. Safe to call more than once;
/// only the first call installs anything.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
