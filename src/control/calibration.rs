// Baseline calibration - averaging the wall distance at startup
//
// The robot is placed parallel to the wall before starting. CalibrationState
// accumulates N distance samples and yields their arithmetic mean; calibrate()
// drives the sensor to fill it, one sample per interval.

use tracing::{debug, info};

use crate::config::CalibrationConfig;
use crate::error::WiperError;
use crate::sensor::RangeSensor;
use crate::timing::Clock;

use super::CancellationToken;

/// Running sum over a fixed number of calibration samples
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    sum_m: f64,
    collected: usize,
    required: usize,
}

impl CalibrationState {
    /// Create an empty accumulator for `required` samples
    ///
    /// # Errors
    /// `required == 0` is a configuration error.
    pub fn new(required: usize) -> Result<Self, WiperError> {
        if required == 0 {
            return Err(WiperError::Configuration {
                reason: "calibration cycles must be at least 1".to_string(),
            });
        }
        Ok(Self {
            sum_m: 0.0,
            collected: 0,
            required,
        })
    }

    /// Add one distance sample; ignored once the state is complete
    pub fn add_sample(&mut self, distance_m: f32) {
        if self.is_complete() {
            return;
        }
        self.sum_m += f64::from(distance_m);
        self.collected += 1;
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_complete(&self) -> bool {
        self.collected >= self.required
    }

    /// Mean of the collected samples, available once all are in
    pub fn baseline(&self) -> Option<f32> {
        if self.is_complete() {
            Some((self.sum_m / self.required as f64) as f32)
        } else {
            None
        }
    }
}

/// Result of a calibration run that did not fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    /// Mean wall distance in meters
    Baseline(f32),
    /// Termination was requested before all samples were collected
    Cancelled { collected: usize },
}

/// Poll `sensor` `config.cycles` times and average the distances
///
/// Each read is followed by the calibration interval and a cancellation
/// checkpoint. A failed read aborts immediately.
pub fn calibrate<S, C>(
    sensor: &mut S,
    clock: &C,
    token: &CancellationToken,
    config: &CalibrationConfig,
) -> Result<CalibrationOutcome, WiperError>
where
    S: RangeSensor,
    C: Clock,
{
    let mut state = CalibrationState::new(config.cycles)?;
    info!(
        "[Calibration] Calibrating wall distance over {} samples",
        state.required()
    );

    while !state.is_complete() {
        let sample = sensor.read()?;
        state.add_sample(sample.distance_m);
        debug!(
            "[Calibration] Sample {}/{}: {} us = {:.1} cm",
            state.collected(),
            state.required(),
            sample.echo_us,
            sample.distance_cm()
        );

        clock.delay(config.interval());
        if token.is_cancelled() {
            info!(
                "[Calibration] Interrupted after {} samples",
                state.collected()
            );
            return Ok(CalibrationOutcome::Cancelled {
                collected: state.collected(),
            });
        }
    }

    // The state was just completed, so the baseline exists.
    let baseline = state.baseline().unwrap_or_default();
    info!(
        "[Calibration] Calibrated wall distance = {:6.1} cm",
        baseline * 100.0
    );
    Ok(CalibrationOutcome::Baseline(baseline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::sensor::Sample;
    use crate::testing::{ScriptedSensor, StubClock};
    use std::time::Duration;

    fn config(cycles: usize) -> CalibrationConfig {
        CalibrationConfig {
            cycles,
            interval_ms: 100,
        }
    }

    #[test]
    fn test_baseline_of_identical_samples() {
        let mut state = CalibrationState::new(10).unwrap();
        for _ in 0..10 {
            state.add_sample(1.0);
        }
        assert_eq!(state.baseline(), Some(1.0));
    }

    #[test]
    fn test_baseline_is_mean() {
        let mut state = CalibrationState::new(4).unwrap();
        for distance in [0.5, 0.7, 0.9, 1.1] {
            assert_eq!(state.baseline(), None);
            state.add_sample(distance);
        }
        let baseline = state.baseline().unwrap();
        assert!((baseline - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_extra_samples_ignored() {
        let mut state = CalibrationState::new(1).unwrap();
        state.add_sample(2.0);
        state.add_sample(100.0);
        assert_eq!(state.collected(), 1);
        assert_eq!(state.baseline(), Some(2.0));
    }

    #[test]
    fn test_zero_cycles_is_configuration_error() {
        assert!(matches!(
            CalibrationState::new(0),
            Err(WiperError::Configuration { .. })
        ));
    }

    #[test]
    fn test_calibrate_reads_n_samples_at_interval() {
        let mut sensor = ScriptedSensor::from_distances(&[1.0; 10]);
        let clock = StubClock::new(Duration::ZERO);
        let token = CancellationToken::new();

        let outcome = calibrate(&mut sensor, &clock, &token, &config(10)).unwrap();

        assert_eq!(outcome, CalibrationOutcome::Baseline(1.0));
        assert_eq!(sensor.reads(), 10);
        assert_eq!(clock.delays(), vec![Duration::from_millis(100); 10]);
    }

    #[test]
    fn test_calibrate_propagates_read_failure() {
        let mut sensor = ScriptedSensor::from_distances(&[1.0, 1.0]);
        sensor.push(Err(SensorError::Unavailable {
            reason: "unplugged".to_string(),
        }));
        sensor.push(Ok(Sample::from_distance(1.0)));
        let clock = StubClock::new(Duration::ZERO);
        let token = CancellationToken::new();

        let result = calibrate(&mut sensor, &clock, &token, &config(10));

        assert!(matches!(result, Err(WiperError::ReadFailure(_))));
        assert_eq!(sensor.reads(), 3);
    }

    #[test]
    fn test_calibrate_stops_on_cancellation() {
        let mut sensor = ScriptedSensor::from_distances(&[1.0; 10]);
        let clock = StubClock::new(Duration::ZERO);
        let token = CancellationToken::new();
        clock.cancel_on_delay(Duration::from_millis(100), 3, &token);

        let outcome = calibrate(&mut sensor, &clock, &token, &config(10)).unwrap();

        assert_eq!(outcome, CalibrationOutcome::Cancelled { collected: 3 });
        assert_eq!(sensor.reads(), 3);
    }

    #[test]
    fn test_calibrate_rejects_zero_cycles_before_reading() {
        let mut sensor = ScriptedSensor::from_distances(&[1.0]);
        let clock = StubClock::new(Duration::ZERO);
        let token = CancellationToken::new();

        let result = calibrate(&mut sensor, &clock, &token, &config(0));

        assert!(matches!(result, Err(WiperError::Configuration { .. })));
        assert_eq!(sensor.reads(), 0);
    }
}
