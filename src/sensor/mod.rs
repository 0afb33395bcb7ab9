// Range sensor - ultrasonic distance readings
//
// A reading is one (echo duration, distance) pair. Distances are derived
// from the echo width at the speed of sound, and every reading that leaves
// a sensor has already been through the secondary-reflection clamp.

pub mod hcsr04;

pub use hcsr04::Hcsr04;

use crate::error::SensorError;

/// Speed of sound used for echo-to-distance conversion (m/s)
pub const SPEED_OF_SOUND_M_S: f32 = 340.0;

/// Echoes longer than this are treated as carrying a secondary reflection (us)
pub const REFLECTION_THRESHOLD_US: u32 = 1000;

/// Distance equivalent of [`REFLECTION_THRESHOLD_US`] (m)
pub const REFLECTION_OFFSET_M: f32 = 0.17;

/// One sensor poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Echo pulse width in microseconds
    pub echo_us: u32,
    /// Distance in meters
    pub distance_m: f32,
}

impl Sample {
    pub fn new(echo_us: u32, distance_m: f32) -> Self {
        Self {
            echo_us,
            distance_m,
        }
    }

    /// Convert an echo width to the one-way distance to the reflector
    pub fn from_echo_us(echo_us: u32) -> Self {
        let distance_m = echo_us as f32 / 1_000_000.0 * SPEED_OF_SOUND_M_S / 2.0;
        Self::new(echo_us, distance_m)
    }

    /// Inverse of [`Sample::from_echo_us`], rounded to the nearest microsecond
    pub fn from_distance(distance_m: f32) -> Self {
        let echo_us = (distance_m * 2.0 / SPEED_OF_SOUND_M_S * 1_000_000.0).round();
        Self::new(echo_us.max(0.0) as u32, distance_m)
    }

    /// Remove the secondary-reflection artifact
    ///
    /// Echoes strictly longer than 1000 us lose 1000 us and 0.17 m. Exactly
    /// 1000 us is left alone.
    pub fn clamp_reflection(self) -> Self {
        if self.echo_us > REFLECTION_THRESHOLD_US {
            Self::new(
                self.echo_us - REFLECTION_THRESHOLD_US,
                self.distance_m - REFLECTION_OFFSET_M,
            )
        } else {
            self
        }
    }

    pub fn distance_cm(&self) -> f32 {
        self.distance_m * 100.0
    }
}

/// Blocking distance sensor
///
/// Initialization is construction and deinitialization is drop.
pub trait RangeSensor {
    /// Take one measurement
    fn read(&mut self) -> Result<Sample, SensorError>;
}

impl<S: RangeSensor + ?Sized> RangeSensor for Box<S> {
    fn read(&mut self) -> Result<Sample, SensorError> {
        (**self).read()
    }
}
