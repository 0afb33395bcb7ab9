//! Configuration for the whiteboard wiper
//!
//! Every threshold and line assignment has a compile-time default below. A
//! JSON file named by `WHITEBOARD_WIPER_CONFIG` can override any subset of
//! them for bench work on a different board without recompiling; missing
//! sections and fields keep their defaults.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WiperError;

/// Environment variable naming an optional JSON override file
pub const CONFIG_ENV_VAR: &str = "WHITEBOARD_WIPER_CONFIG";

pub const GPIO_CHIP: &str = "/dev/gpiochip0";
pub const MOTOR_RIGHT_1_OFFSET: u32 = 15;
pub const MOTOR_RIGHT_2_OFFSET: u32 = 18;
pub const MOTOR_LEFT_1_OFFSET: u32 = 23;
pub const MOTOR_LEFT_2_OFFSET: u32 = 24;
pub const TRIG_GPIO_OFFSET: u32 = 17;
pub const ECHO_GPIO_OFFSET: u32 = 27;

pub const CAL_CYCLES: usize = 10;
pub const CAL_INTERVAL_MS: u64 = 100;
pub const WALL_RANGE_M: f32 = 0.05;
pub const REVERSE_TIME_US: u64 = 1_000_000;
pub const TURNAROUND_TIME_US: u64 = 1_000_000;
pub const SETTLE_TIME_US: u64 = 10;
pub const POLL_INTERVAL_MS: u64 = 100;
pub const ECHO_TIMEOUT_US: u64 = 60_000;
pub const SCHED_PRIORITY: i32 = 80;
pub const SCHED_CPU: usize = 0;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiperConfig {
    pub gpio: GpioConfig,
    pub calibration: CalibrationConfig,
    pub control: ControlConfig,
    pub sensor: SensorConfig,
    pub realtime: RealtimeConfig,
}

/// Chip path and line offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub chip_path: String,
    pub motor_right_1: u32,
    pub motor_right_2: u32,
    pub motor_left_1: u32,
    pub motor_left_2: u32,
    pub trigger: u32,
    pub echo: u32,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chip_path: GPIO_CHIP.to_string(),
            motor_right_1: MOTOR_RIGHT_1_OFFSET,
            motor_right_2: MOTOR_RIGHT_2_OFFSET,
            motor_left_1: MOTOR_LEFT_1_OFFSET,
            motor_left_2: MOTOR_LEFT_2_OFFSET,
            trigger: TRIG_GPIO_OFFSET,
            echo: ECHO_GPIO_OFFSET,
        }
    }
}

impl GpioConfig {
    /// Every offset in request order: motors, then trigger and echo
    pub fn offsets(&self) -> [u32; 6] {
        [
            self.motor_right_1,
            self.motor_right_2,
            self.motor_left_1,
            self.motor_left_2,
            self.trigger,
            self.echo,
        ]
    }
}

/// Baseline calibration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of samples averaged into the baseline
    pub cycles: usize,
    /// Pause after each calibration sample
    pub interval_ms: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            cycles: CAL_CYCLES,
            interval_ms: CAL_INTERVAL_MS,
        }
    }
}

impl CalibrationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Wall following and recovery maneuver timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Allowed deviation from the baseline before recovering (m)
    pub wall_range_m: f32,
    pub reverse_time_us: u64,
    pub turnaround_time_us: u64,
    /// Pause between a stop and the next command
    pub settle_time_us: u64,
    pub poll_interval_ms: u64,
    /// Pulse the motors once after init
    pub motor_self_test: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            wall_range_m: WALL_RANGE_M,
            reverse_time_us: REVERSE_TIME_US,
            turnaround_time_us: TURNAROUND_TIME_US,
            settle_time_us: SETTLE_TIME_US,
            poll_interval_ms: POLL_INTERVAL_MS,
            motor_self_test: true,
        }
    }
}

impl ControlConfig {
    pub fn reverse_time(&self) -> Duration {
        Duration::from_micros(self.reverse_time_us)
    }

    pub fn turnaround_time(&self) -> Duration {
        Duration::from_micros(self.turnaround_time_us)
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_micros(self.settle_time_us)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// HC-SR04 driver parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Give up waiting for an echo edge after this long
    pub echo_timeout_us: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            echo_timeout_us: ECHO_TIMEOUT_US,
        }
    }
}

/// Soft real-time scheduling for the control thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub enabled: bool,
    /// SCHED_FIFO priority
    pub priority: i32,
    /// Core the process is pinned to
    pub cpu: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: SCHED_PRIORITY,
            cpu: SCHED_CPU,
        }
    }
}

impl WiperConfig {
    /// Load configuration from JSON file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load overrides from `WHITEBOARD_WIPER_CONFIG`, or use the built-in constants
    pub fn load() -> Self {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from_file(path),
            None => {
                log::info!("[Config] Using built-in configuration");
                Self::default()
            }
        }
    }

    /// Reject configurations the control loop cannot run with
    pub fn validate(&self) -> Result<(), WiperError> {
        if self.calibration.cycles == 0 {
            return Err(WiperError::Configuration {
                reason: "calibration cycles must be at least 1".to_string(),
            });
        }
        if !self.control.wall_range_m.is_finite() || self.control.wall_range_m < 0.0 {
            return Err(WiperError::Configuration {
                reason: format!(
                    "wall range must be a non-negative distance (got {})",
                    self.control.wall_range_m
                ),
            });
        }
        if self.gpio.chip_path.is_empty() {
            return Err(WiperError::Configuration {
                reason: "GPIO chip path is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for offset in self.gpio.offsets() {
            if !seen.insert(offset) {
                return Err(WiperError::Configuration {
                    reason: format!("GPIO line {} is assigned more than once", offset),
                });
            }
        }
        Ok(())
    }
}
