use std::collections::VecDeque;

use crate::error::SensorError;
use crate::sensor::{RangeSensor, Sample};

/// Range sensor that replays a fixed list of readings.
///
/// Once the script is exhausted every read fails with
/// [`SensorError::Unavailable`].
pub struct ScriptedSensor {
    readings: VecDeque<Result<Sample, SensorError>>,
    reads: usize,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = Result<Sample, SensorError>>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            reads: 0,
        }
    }

    /// Successful readings at the given distances (meters).
    pub fn from_distances(distances: &[f32]) -> Self {
        Self::new(
            distances
                .iter()
                .map(|&distance_m| Ok(Sample::from_distance(distance_m))),
        )
    }

    /// Append readings to the end of the script.
    pub fn push(&mut self, reading: Result<Sample, SensorError>) {
        self.readings.push_back(reading);
    }

    /// Number of reads attempted so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl RangeSensor for ScriptedSensor {
    fn read(&mut self) -> Result<Sample, SensorError> {
        self.reads += 1;
        self.readings
            .pop_front()
            .unwrap_or_else(|| {
                Err(SensorError::Unavailable {
                    reason: "script exhausted".to_string(),
                })
            })
    }
}
