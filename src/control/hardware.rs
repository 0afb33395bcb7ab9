//! Exclusive ownership of the robot's motors and range sensor.

use tracing::info;

use crate::config::WiperConfig;
use crate::error::{log_gpio_error, GpioError, WiperError};
use crate::gpio::{LineProvider, OutputLine};
use crate::motor::Motors;
use crate::sensor::{Hcsr04, RangeSensor};
use crate::timing::Clock;

/// Motors and sensor owned by the control loop
///
/// Acquisition order is motors, then sensor. Field order makes an implicit
/// drop release them in reverse; [`HardwareContext::shutdown`] does the same
/// explicitly after commanding stop.
pub struct HardwareContext<S: RangeSensor, O: OutputLine> {
    pub sensor: S,
    pub motors: Motors<O>,
}

impl<S: RangeSensor, O: OutputLine> HardwareContext<S, O> {
    pub fn new(motors: Motors<O>, sensor: S) -> Self {
        Self { sensor, motors }
    }

    /// Stop the motors, release the sensor, then release the motor lines
    ///
    /// The lines are released even if the stop command fails; that failure
    /// is logged and returned.
    pub fn shutdown(self) -> Result<(), GpioError> {
        let Self { sensor, mut motors } = self;
        let stopped = motors.stop();
        if let Err(err) = &stopped {
            log_gpio_error(err, "shutdown");
        }
        drop(sensor);
        motors.release();
        info!("[Wiper] Hardware released");
        stopped
    }
}

/// Request motor lines and the HC-SR04 from `provider`
///
/// # Errors
/// `InitializationFailure` naming the component that could not be acquired.
/// Anything acquired before the failure is released.
pub fn acquire<P, C>(
    provider: &P,
    config: &WiperConfig,
    clock: C,
) -> Result<HardwareContext<Hcsr04<P::Output, P::Input, C>, P::Output>, WiperError>
where
    P: LineProvider,
    C: Clock,
{
    info!("[Wiper] Start init procedure on {}", provider.chip_path());
    let motors = Motors::init(provider, &config.gpio).map_err(|err| WiperError::init("motors", err))?;
    let sensor = Hcsr04::init(
        provider,
        config.gpio.trigger,
        config.gpio.echo,
        clock,
        &config.sensor,
    )
    .map_err(|err| WiperError::init("hcsr04", err))?;

    Ok(HardwareContext::new(motors, sensor))
}
