//! HC-SR04 ultrasonic ranger over one trigger and one echo line.
//!
//! A measurement drives a 10 us trigger pulse, then busy-waits on the echo
//! line for its rising and falling edges. The pulse width is the round-trip
//! time of flight. Both waits give up after the configured echo timeout.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::SensorConfig;
use crate::error::{EchoEdge, GpioError, SensorError};
use crate::gpio::{InputLine, LineProvider, LineValue, OutputLine};
use crate::timing::Clock;

use super::{RangeSensor, Sample};

pub const TRIGGER_CONSUMER: &str = "hcsr04-trig";
pub const ECHO_CONSUMER: &str = "hcsr04-echo";

const TRIGGER_SETTLE_US: u64 = 2;
const TRIGGER_PULSE_US: u64 = 10;

pub struct Hcsr04<O: OutputLine, I: InputLine, C: Clock> {
    // Declared before `trigger` so the echo line is released first.
    echo: I,
    trigger: O,
    clock: C,
    timeout: Duration,
}

impl<O: OutputLine, I: InputLine, C: Clock> Hcsr04<O, I, C> {
    pub fn new(trigger: O, echo: I, clock: C, timeout: Duration) -> Self {
        Self {
            echo,
            trigger,
            clock,
            timeout,
        }
    }

    /// Request the trigger (output, low) and echo (input) lines
    pub fn init<P>(
        provider: &P,
        trigger_offset: u32,
        echo_offset: u32,
        clock: C,
        config: &SensorConfig,
    ) -> Result<Self, GpioError>
    where
        P: LineProvider<Output = O, Input = I>,
    {
        let trigger =
            provider.request_output_line(trigger_offset, LineValue::Inactive, TRIGGER_CONSUMER)?;
        let echo = provider.request_input_line(echo_offset, ECHO_CONSUMER)?;

        info!(
            "[Hcsr04] Initialized (trigger={}, echo={}, timeout={} us)",
            trigger_offset, echo_offset, config.echo_timeout_us
        );
        Ok(Self::new(
            trigger,
            echo,
            clock,
            Duration::from_micros(config.echo_timeout_us),
        ))
    }

    /// One measurement without the reflection clamp
    pub fn measure(&mut self) -> Result<Sample, SensorError> {
        self.pulse_trigger()?;

        let rise = self.wait_for_echo(LineValue::Active, EchoEdge::Rising)?;
        let fall = self.wait_for_echo(LineValue::Inactive, EchoEdge::Falling)?;

        let echo_us = fall.duration_since(rise).as_micros();
        let sample = Sample::from_echo_us(u32::try_from(echo_us).unwrap_or(u32::MAX));
        debug!(
            "[Hcsr04] Raw echo {} us = {:.3} m",
            sample.echo_us, sample.distance_m
        );
        Ok(sample)
    }

    fn pulse_trigger(&mut self) -> Result<(), GpioError> {
        self.trigger.set_value(LineValue::Inactive)?;
        self.clock.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_value(LineValue::Active)?;
        self.clock.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_value(LineValue::Inactive)
    }

    fn wait_for_echo(&mut self, level: LineValue, edge: EchoEdge) -> Result<Instant, SensorError> {
        let start = self.clock.now();
        loop {
            if self.echo.value()? == level {
                return Ok(self.clock.now());
            }
            let waited = self.clock.now().duration_since(start);
            if waited > self.timeout {
                return Err(SensorError::EchoTimeout {
                    edge,
                    waited_us: waited.as_micros() as u64,
                });
            }
        }
    }
}

impl<O: OutputLine, I: InputLine, C: Clock> RangeSensor for Hcsr04<O, I, C> {
    fn read(&mut self) -> Result<Sample, SensorError> {
        Ok(self.measure()?.clamp_reflection())
    }
}

impl<O: OutputLine, I: InputLine, C: Clock> Drop for Hcsr04<O, I, C> {
    fn drop(&mut self) {
        info!(
            "[Hcsr04] Deinitializing (trigger={}, echo={})",
            self.trigger.offset(),
            self.echo.offset()
        );
    }
}
