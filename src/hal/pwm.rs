use embedded_hal::PwmPin;
use embedded_time::rate::Hertz;
use num_traits::{NumCast, ToPrimitive};

use super::{DutyMode, PwmChannel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinError {
    /// The requested duty does not fit the pin's duty type.
    DutyOutOfRange,
}

/// A [`PwmChannel`] over an `embedded-hal` [`PwmPin`].
///
/// The pin's timer is expected to already run at the ESC frequency, so
/// `claim` and `configure` only record the request.
/// ```
/// use embedded_hal::PwmPin;
/// use quad_flight::hal::{PwmChannel, PwmPinChannel};
///
/// struct Pin(u16);
///
/// impl PwmPin for Pin {
///     type Duty = u16;
///
///     fn disable(&mut self) {}
///     fn enable(&mut self) {}
///     fn get_duty(&self) -> u16 { self.0 }
///     fn get_max_duty(&self) -> u16 { 1000 }
///     fn set_duty(&mut self, duty: u16) { self.0 = duty }
/// }
///
/// let mut channel = PwmPinChannel::new(Pin(0));
/// channel.set_duty(7.5).unwrap();
/// assert_eq!(channel.pin().get_duty(), 75);
/// ```
pub struct PwmPinChannel<P> {
    pin: P,
    mode: DutyMode,
}

impl<P: PwmPin> PwmPinChannel<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            mode: DutyMode::ActiveHigh,
        }
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> PwmChannel for PwmPinChannel<P>
where
    P: PwmPin,
    P::Duty: NumCast + ToPrimitive + Copy,
{
    type Error = PinError;

    fn claim(&mut self, _pin: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn configure(&mut self, _frequency: Hertz, mode: DutyMode) -> Result<(), Self::Error> {
        self.mode = mode;
        Ok(())
    }

    fn set_duty(&mut self, duty: f32) -> Result<(), Self::Error> {
        let max = self
            .pin
            .get_max_duty()
            .to_f32()
            .ok_or(PinError::DutyOutOfRange)?;

        let high = match self.mode {
            DutyMode::ActiveHigh => duty,
            DutyMode::ActiveLow => 100. - duty,
        };
        let raw =
            <P::Duty as NumCast>::from(max * high / 100.).ok_or(PinError::DutyOutOfRange)?;
        self.pin.set_duty(raw);

        Ok(())
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.pin.enable();
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.pin.disable();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PinError, PwmPinChannel};
    use crate::hal::{DutyMode, PwmChannel};
    use embedded_hal::PwmPin;
    use embedded_time::rate::Hertz;

    struct Pin<D> {
        duty: D,
        max: D,
        is_enabled: bool,
    }

    impl<D: Copy> PwmPin for Pin<D> {
        type Duty = D;

        fn disable(&mut self) {
            self.is_enabled = false;
        }

        fn enable(&mut self) {
            self.is_enabled = true;
        }

        fn get_duty(&self) -> D {
            self.duty
        }

        fn get_max_duty(&self) -> D {
            self.max
        }

        fn set_duty(&mut self, duty: D) {
            self.duty = duty;
        }
    }

    fn pin(max: u16) -> Pin<u16> {
        Pin {
            duty: 0,
            max,
            is_enabled: false,
        }
    }

    #[test]
    fn active_low_inverts_duty() {
        let mut channel = PwmPinChannel::new(pin(1000));
        channel.configure(Hertz(50), DutyMode::ActiveLow).unwrap();

        channel.set_duty(7.5).unwrap();
        assert_eq!(channel.pin().get_duty(), 925);

        channel.set_duty(0.).unwrap();
        assert_eq!(channel.pin().get_duty(), 1000);
    }

    #[test]
    fn enable_and_disable_reach_the_pin() {
        let mut channel = PwmPinChannel::new(pin(1000));
        channel.claim(26).unwrap();

        channel.enable().unwrap();
        assert!(channel.pin().is_enabled);
        channel.disable().unwrap();
        assert!(!channel.into_inner().is_enabled);
    }

    #[test]
    fn duty_that_does_not_fit_is_rejected() {
        let mut channel = PwmPinChannel::new(Pin {
            duty: 0u8,
            max: 255,
            is_enabled: false,
        });

        assert_eq!(channel.set_duty(150.), Err(PinError::DutyOutOfRange));
        assert_eq!(channel.pin().get_duty(), 0);

        channel.set_duty(100.).unwrap();
        assert_eq!(channel.pin().get_duty(), 255);
    }
}
