//! Electronic speed controller driven by a single PWM channel.

mod builder;
pub use builder::Builder;

use embedded_hal::blocking::delay::DelayMs;
use embedded_time::rate::Hertz;

use crate::hal::{DutyMode, PwmChannel};

/// Throttle below this percentage cuts the signal entirely instead of
/// commanding the bottom of the band.
pub const CUTOFF: f32 = 0.01;

/// Clamp a throttle percentage into [0, 100]. NaN is treated as off.
pub fn clamp_throttle(percentage: f32) -> f32 {
    if percentage.is_nan() {
        0.
    } else {
        percentage.clamp(0., 100.)
    }
}

/// Operating range of the ESC as percentages of the PWM period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DutyBand {
    min: f32,
    max: f32,
}

impl Default for DutyBand {
    /// 1ms to 2ms pulses at 50Hz.
    fn default() -> Self {
        Self { min: 5., max: 10. }
    }
}

impl DutyBand {
    /// Returns `None` unless `0 <= min < max <= 100`.
    pub fn new(min: f32, max: f32) -> Option<Self> {
        if min >= 0. && max <= 100. && min < max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Convert a throttle percentage to a duty cycle.
    /// ```
    /// use quad_flight::esc::DutyBand;
    ///
    /// let band = DutyBand::default();
    /// assert_eq!(band.duty(0.), 0.);
    /// assert_eq!(band.duty(50.), 7.5);
    /// assert_eq!(band.duty(250.), 10.);
    /// ```
    pub fn duty(&self, throttle: f32) -> f32 {
        let throttle = clamp_throttle(throttle);
        if throttle < CUTOFF {
            return 0.;
        }

        (self.min + (self.max - self.min) * throttle / 100.).min(self.max)
    }
}

/// One motor's ESC.
///
/// The in-memory throttle and duty always mirror the last value the channel
/// accepted.
pub struct Esc<C> {
    channel: C,
    pin: u8,
    frequency: Hertz,
    band: DutyBand,
    mode: DutyMode,
    calibration_delay_ms: u16,
    throttle: f32,
    duty: f32,
    is_configured: bool,
    is_running: bool,
}

impl<C: PwmChannel> Esc<C> {
    /// Create an ESC with the default 50Hz, 5% to 10% configuration.
    pub fn new(channel: C, pin: u8) -> Self {
        Builder::default().build(channel, pin)
    }

    /// Claim and configure the channel.
    pub fn initialize(&mut self) -> Result<(), C::Error> {
        self.channel.claim(self.pin)?;
        self.channel.configure(self.frequency, self.mode)?;
        self.is_configured = true;

        Ok(())
    }

    /// Enable output at the current duty.
    pub fn start(&mut self) -> Result<(), C::Error> {
        self.channel.enable()?;
        self.is_running = true;

        Ok(())
    }

    /// Zero the duty, then disable output.
    ///
    /// Disabling first can leave the last pulse width latched on some timers.
    pub fn stop(&mut self) -> Result<(), C::Error> {
        self.channel.set_duty(0.)?;
        self.throttle = 0.;
        self.duty = 0.;

        self.channel.disable()?;
        self.is_running = false;

        Ok(())
    }

    /// Set the throttle as a percentage, clamped to [0, 100].
    ///
    /// If the channel rejects the new duty nothing changes.
    pub fn set_throttle(&mut self, percentage: f32) -> Result<(), C::Error> {
        let throttle = clamp_throttle(percentage);
        let duty = self.band.duty(throttle);

        self.write_duty(throttle, duty)
    }

    fn write_duty(&mut self, throttle: f32, duty: f32) -> Result<(), C::Error> {
        if let Err(error) = self.channel.set_duty(duty) {
            log::warn!(
                "ESC on pin {} rejected {}% duty, holding {}%",
                self.pin,
                duty,
                self.duty
            );
            return Err(error);
        }

        self.throttle = throttle;
        self.duty = duty;

        Ok(())
    }

    /// Teach the ESC its throttle range by holding the top and then the
    /// bottom of the band. Output must already be running and the props off.
    ///
    /// On failure the ESC is left at the last duty the channel accepted.
    pub fn calibrate<D>(&mut self, delay: &mut D) -> Result<(), C::Error>
    where
        D: DelayMs<u16>,
    {
        log::info!("calibrating ESC on pin {}", self.pin);

        self.write_duty(100., self.band.max)?;
        delay.delay_ms(self.calibration_delay_ms);

        // Bottom of the band is still zero throttle
        self.write_duty(0., self.band.min)?;
        delay.delay_ms(self.calibration_delay_ms);

        self.write_duty(0., 0.)
    }

    /// The last committed throttle percentage.
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// The last committed duty as a percentage of the period.
    pub fn duty(&self) -> f32 {
        self.duty
    }

    pub fn is_configured(&self) -> bool {
        self.is_configured
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn band(&self) -> DutyBand {
        self.band
    }

    pub fn frequency(&self) -> Hertz {
        self.frequency
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}
