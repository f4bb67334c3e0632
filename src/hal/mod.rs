//! Hardware capabilities consumed by the flight core.
//!
//! The core never touches timers or bus registers directly. A board support
//! crate provides a [`PwmChannel`] per motor and a [`SensorBus`] for the
//! inertial sensor, either by implementing the traits itself or through the
//! [`PwmPinChannel`] and [`I2cBus`] adapters over `embedded-hal`.

use embedded_time::rate::Hertz;

mod i2c;
pub use i2c::{BusError, I2cBus};

mod pwm;
pub use pwm::{PinError, PwmPinChannel};

/// Polarity of the generated pulse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DutyMode {
    /// The signal is high for the duty portion of the period.
    #[default]
    ActiveHigh,
    /// The signal is low for the duty portion of the period.
    ActiveLow,
}

/// One physical PWM output.
pub trait PwmChannel {
    type Error;

    /// Bind this channel to its output pin.
    fn claim(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Program the period and duty polarity.
    fn configure(&mut self, frequency: Hertz, mode: DutyMode) -> Result<(), Self::Error>;

    /// Set the duty cycle as a percentage of the period in [0, 100].
    fn set_duty(&mut self, duty: f32) -> Result<(), Self::Error>;

    fn enable(&mut self) -> Result<(), Self::Error>;

    fn disable(&mut self) -> Result<(), Self::Error>;
}

impl<T: PwmChannel + ?Sized> PwmChannel for &mut T {
    type Error = T::Error;

    fn claim(&mut self, pin: u8) -> Result<(), Self::Error> {
        (**self).claim(pin)
    }

    fn configure(&mut self, frequency: Hertz, mode: DutyMode) -> Result<(), Self::Error> {
        (**self).configure(frequency, mode)
    }

    fn set_duty(&mut self, duty: f32) -> Result<(), Self::Error> {
        (**self).set_duty(duty)
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        (**self).enable()
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        (**self).disable()
    }
}

/// A register oriented bus to a single sensor chip.
pub trait SensorBus {
    type Error;

    /// Address the device at `address` for all following transactions.
    fn open(&mut self, address: u8) -> Result<(), Self::Error>;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Read consecutive registers starting at `register`.
    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = self.read_register(register.wrapping_add(offset as u8))?;
        }
        Ok(())
    }
}
