// Control module - calibration and the wall-following loop
//
// The control flow:
// 1. Acquire the motors and sensor into a HardwareContext
// 2. Optionally pulse the motors as a self-test
// 3. Average N sensor samples into a baseline wall distance
// 4. Follow the wall, recovering (stop, reverse, turn, forward) whenever
//    the distance leaves the tolerance band
// 5. Stop on a termination request or a fatal error, then release hardware
//
// Termination is cooperative: the CancellationToken is only consulted at
// checkpoints between blocking delays.

pub mod calibration;
pub mod cancel;
pub mod hardware;
pub mod wiper;

pub use calibration::{calibrate, CalibrationOutcome, CalibrationState};
pub use cancel::CancellationToken;
pub use hardware::{acquire, HardwareContext};
pub use wiper::{
    evaluate, run_wiper, Phase, RecoveryOutcome, RunSummary, RunningState, StopReason, WiperLoop,
    WiperState,
};
