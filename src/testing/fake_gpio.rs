use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::GpioError;
use crate::gpio::{InputLine, LineProvider, LineValue, OutputLine};

/// Observable side effect on a [`FakeChip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    RequestedOutput {
        offset: u32,
        initial: LineValue,
        consumer: String,
    },
    RequestedInput {
        offset: u32,
        consumer: String,
    },
    Set {
        offset: u32,
        value: LineValue,
    },
    Released {
        offset: u32,
    },
}

#[derive(Default)]
struct FakeChipState {
    events: Vec<LineEvent>,
    levels: HashMap<u32, LineValue>,
    held: HashSet<u32>,
    fail_requests: HashSet<u32>,
    fail_writes: HashSet<u32>,
    fail_reads: HashSet<u32>,
    input_scripts: HashMap<u32, VecDeque<LineValue>>,
}

/// In-memory GPIO chip. Clones share state.
#[derive(Clone)]
pub struct FakeChip {
    path: String,
    state: Arc<Mutex<FakeChipState>>,
}

impl FakeChip {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: Arc::new(Mutex::new(FakeChipState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeChipState> {
        self.state.lock().expect("fake chip state poisoned")
    }

    /// Make every request for `offset` fail.
    pub fn fail_request_on(&self, offset: u32) {
        self.state().fail_requests.insert(offset);
    }

    /// Make every write to `offset` fail.
    pub fn fail_writes_on(&self, offset: u32) {
        self.state().fail_writes.insert(offset);
    }

    /// Make every read of `offset` fail.
    pub fn fail_reads_on(&self, offset: u32) {
        self.state().fail_reads.insert(offset);
    }

    /// Queue levels returned by successive reads of `offset`.
    ///
    /// Once the script runs out, reads keep returning the last level.
    pub fn script_input(&self, offset: u32, values: impl IntoIterator<Item = LineValue>) {
        self.state()
            .input_scripts
            .entry(offset)
            .or_default()
            .extend(values);
    }

    pub fn events(&self) -> Vec<LineEvent> {
        self.state().events.clone()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Successful writes to `offset`, in order.
    pub fn writes_for(&self, offset: u32) -> Vec<LineValue> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                LineEvent::Set { offset: o, value } if *o == offset => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Current level of `offset`, if it was ever requested.
    pub fn level(&self, offset: u32) -> Option<LineValue> {
        self.state().levels.get(&offset).copied()
    }

    /// Whether `offset` was requested and has since been released.
    pub fn is_released(&self, offset: u32) -> bool {
        let state = self.state();
        !state.held.contains(&offset)
            && state
                .events
                .iter()
                .any(|event| *event == LineEvent::Released { offset })
    }

    /// Offsets currently requested, sorted.
    pub fn held_offsets(&self) -> Vec<u32> {
        let mut held: Vec<u32> = self.state().held.iter().copied().collect();
        held.sort_unstable();
        held
    }

    fn acquire(&self, offset: u32, event: LineEvent, initial: LineValue) -> Result<FakeLine, GpioError> {
        let mut state = self.state();
        if state.fail_requests.contains(&offset) {
            return Err(GpioError::RequestFailed {
                chip: self.path.clone(),
                offset,
                reason: "injected request failure".to_string(),
            });
        }
        if !state.held.insert(offset) {
            return Err(GpioError::RequestFailed {
                chip: self.path.clone(),
                offset,
                reason: "Device or resource busy".to_string(),
            });
        }
        state.levels.insert(offset, initial);
        state.events.push(event);
        Ok(FakeLine {
            chip: self.clone(),
            offset,
        })
    }
}

impl LineProvider for FakeChip {
    type Output = FakeLine;
    type Input = FakeLine;

    fn chip_path(&self) -> &str {
        &self.path
    }

    fn request_output_line(
        &self,
        offset: u32,
        initial: LineValue,
        consumer: &str,
    ) -> Result<FakeLine, GpioError> {
        let event = LineEvent::RequestedOutput {
            offset,
            initial,
            consumer: consumer.to_string(),
        };
        self.acquire(offset, event, initial)
    }

    fn request_input_line(&self, offset: u32, consumer: &str) -> Result<FakeLine, GpioError> {
        let event = LineEvent::RequestedInput {
            offset,
            consumer: consumer.to_string(),
        };
        self.acquire(offset, event, LineValue::Inactive)
    }
}

/// Line handle on a [`FakeChip`]; records a release when dropped.
pub struct FakeLine {
    chip: FakeChip,
    offset: u32,
}

impl OutputLine for FakeLine {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn set_value(&mut self, value: LineValue) -> Result<(), GpioError> {
        let mut state = self.chip.state();
        if state.fail_writes.contains(&self.offset) {
            return Err(GpioError::WriteFailed {
                offset: self.offset,
                reason: "injected write failure".to_string(),
            });
        }
        state.levels.insert(self.offset, value);
        state.events.push(LineEvent::Set {
            offset: self.offset,
            value,
        });
        Ok(())
    }
}

impl InputLine for FakeLine {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn value(&mut self) -> Result<LineValue, GpioError> {
        let mut state = self.chip.state();
        if state.fail_reads.contains(&self.offset) {
            return Err(GpioError::ReadFailed {
                offset: self.offset,
                reason: "injected read failure".to_string(),
            });
        }
        let scripted = state
            .input_scripts
            .get_mut(&self.offset)
            .and_then(|script| script.pop_front());
        if let Some(value) = scripted {
            state.levels.insert(self.offset, value);
        }
        Ok(state
            .levels
            .get(&self.offset)
            .copied()
            .unwrap_or(LineValue::Inactive))
    }
}

impl Drop for FakeLine {
    fn drop(&mut self) {
        let mut state = self.chip.state();
        state.held.remove(&self.offset);
        state.events.push(LineEvent::Released {
            offset: self.offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_request_is_busy() {
        let chip = FakeChip::new("/dev/gpiochip0");
        let _line = chip
            .request_output_line(15, LineValue::Inactive, "a")
            .unwrap();
        let second = chip.request_output_line(15, LineValue::Inactive, "b");
        assert!(matches!(second, Err(GpioError::RequestFailed { offset: 15, .. })));
    }

    #[test]
    fn test_scripted_input_sticks_on_last_level() {
        let chip = FakeChip::new("/dev/gpiochip0");
        chip.script_input(27, [LineValue::Active, LineValue::Inactive]);
        let mut line = chip.request_input_line(27, "echo").unwrap();

        assert_eq!(line.value().unwrap(), LineValue::Active);
        assert_eq!(line.value().unwrap(), LineValue::Inactive);
        assert_eq!(line.value().unwrap(), LineValue::Inactive);
    }

    #[test]
    fn test_drop_records_release() {
        let chip = FakeChip::new("/dev/gpiochip0");
        let line = chip
            .request_output_line(22, LineValue::Active, "blink")
            .unwrap();
        assert_eq!(chip.held_offsets(), vec![22]);
        assert!(!chip.is_released(22));

        drop(line);

        assert!(chip.is_released(22));
        assert_eq!(chip.level(22), Some(LineValue::Active));
    }
}
