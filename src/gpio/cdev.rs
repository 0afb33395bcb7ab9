//! GPIO character-device backend built on `gpiocdev`.
//!
//! Each handle owns a single-line [`Request`]. The kernel releases the line
//! when the request's file descriptor is closed, i.e. when the handle drops.

use gpiocdev::line::Value;
use gpiocdev::Request;

use crate::error::GpioError;

use super::{InputLine, LineProvider, LineValue, OutputLine};

impl From<LineValue> for Value {
    fn from(value: LineValue) -> Self {
        match value {
            LineValue::Active => Value::Active,
            LineValue::Inactive => Value::Inactive,
        }
    }
}

impl From<Value> for LineValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Active => LineValue::Active,
            Value::Inactive => LineValue::Inactive,
        }
    }
}

/// A GPIO chip addressed by its device path.
#[derive(Debug, Clone)]
pub struct CdevChip {
    path: String,
}

impl CdevChip {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn request_failed(&self, offset: u32, err: gpiocdev::Error) -> GpioError {
        GpioError::RequestFailed {
            chip: self.path.clone(),
            offset,
            reason: err.to_string(),
        }
    }
}

/// One requested line on a [`CdevChip`].
pub struct CdevLine {
    request: Request,
    offset: u32,
}

impl LineProvider for CdevChip {
    type Output = CdevLine;
    type Input = CdevLine;

    fn chip_path(&self) -> &str {
        &self.path
    }

    fn request_output_line(
        &self,
        offset: u32,
        initial: LineValue,
        consumer: &str,
    ) -> Result<CdevLine, GpioError> {
        let request = Request::builder()
            .on_chip(&self.path)
            .with_consumer(consumer)
            .with_line(offset)
            .as_output(initial.into())
            .request()
            .map_err(|err| self.request_failed(offset, err))?;

        tracing::debug!(
            "[Gpio] Requested output line {} on {} as {} ({})",
            offset,
            self.path,
            consumer,
            initial
        );
        Ok(CdevLine { request, offset })
    }

    fn request_input_line(&self, offset: u32, consumer: &str) -> Result<CdevLine, GpioError> {
        let request = Request::builder()
            .on_chip(&self.path)
            .with_consumer(consumer)
            .with_line(offset)
            .as_input()
            .request()
            .map_err(|err| self.request_failed(offset, err))?;

        tracing::debug!(
            "[Gpio] Requested input line {} on {} as {}",
            offset,
            self.path,
            consumer
        );
        Ok(CdevLine { request, offset })
    }
}

impl OutputLine for CdevLine {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn set_value(&mut self, value: LineValue) -> Result<(), GpioError> {
        self.request
            .set_value(self.offset, value.into())
            .map(|_| ())
            .map_err(|err| GpioError::WriteFailed {
                offset: self.offset,
                reason: err.to_string(),
            })
    }
}

impl InputLine for CdevLine {
    fn offset(&self) -> u32 {
        self.offset
    }

    fn value(&mut self) -> Result<LineValue, GpioError> {
        self.request
            .value(self.offset)
            .map(LineValue::from)
            .map_err(|err| GpioError::ReadFailed {
                offset: self.offset,
                reason: err.to_string(),
            })
    }
}

impl Drop for CdevLine {
    fn drop(&mut self) {
        tracing::debug!("[Gpio] Releasing line {}", self.offset);
    }
}
