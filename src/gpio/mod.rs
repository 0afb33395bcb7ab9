//! Line I/O: requesting, driving, and reading single GPIO lines.
//!
//! The traits here are the seam between the robot logic and the kernel
//! character device. [`cdev::CdevChip`] backs them with `/dev/gpiochipN`;
//! [`crate::testing::FakeChip`] records every request, write, and release
//! for tests. Releasing a line is dropping its handle.

pub mod cdev;
pub mod toggle;

pub use cdev::{CdevChip, CdevLine};
pub use toggle::{toggle_line, ToggleSpec};

use std::fmt;

use crate::error::GpioError;

/// Logical level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineValue {
    Inactive,
    Active,
}

impl LineValue {
    pub fn from_bool(active: bool) -> Self {
        if active {
            LineValue::Active
        } else {
            LineValue::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        self == LineValue::Active
    }

    pub fn toggled(self) -> Self {
        match self {
            LineValue::Active => LineValue::Inactive,
            LineValue::Inactive => LineValue::Active,
        }
    }
}

impl fmt::Display for LineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineValue::Active => write!(f, "1"),
            LineValue::Inactive => write!(f, "0"),
        }
    }
}

/// A requested line configured as an output.
pub trait OutputLine {
    fn offset(&self) -> u32;
    fn set_value(&mut self, value: LineValue) -> Result<(), GpioError>;
}

/// A requested line configured as an input.
pub trait InputLine {
    fn offset(&self) -> u32;
    fn value(&mut self) -> Result<LineValue, GpioError>;
}

/// Source of line requests on one GPIO chip.
pub trait LineProvider {
    type Output: OutputLine;
    type Input: InputLine;

    /// Device path of the chip, e.g. `/dev/gpiochip0`.
    fn chip_path(&self) -> &str;

    fn request_output_line(
        &self,
        offset: u32,
        initial: LineValue,
        consumer: &str,
    ) -> Result<Self::Output, GpioError>;

    fn request_input_line(&self, offset: u32, consumer: &str) -> Result<Self::Input, GpioError>;
}
