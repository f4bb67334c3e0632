use embedded_time::rate::Hertz;

use super::{DutyBand, Esc};
use crate::hal::{DutyMode, PwmChannel};

/// Construction time configuration for an [`Esc`].
pub struct Builder {
    frequency: Hertz,
    band: DutyBand,
    mode: DutyMode,
    calibration_delay_ms: u16,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            frequency: Hertz(50),
            band: DutyBand::default(),
            mode: DutyMode::ActiveHigh,
            calibration_delay_ms: 2000,
        }
    }
}

impl Builder {
    pub fn frequency(mut self, frequency: Hertz) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn band(mut self, band: DutyBand) -> Self {
        self.band = band;
        self
    }

    pub fn mode(mut self, mode: DutyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Time to hold each end of the band during [`Esc::calibrate`].
    pub fn calibration_delay(mut self, ms: u16) -> Self {
        self.calibration_delay_ms = ms;
        self
    }

    /// Build an ESC driving `channel`, which will be claimed on `pin`.
    pub fn build<C: PwmChannel>(self, channel: C, pin: u8) -> Esc<C> {
        Esc {
            channel,
            pin,
            frequency: self.frequency,
            band: self.band,
            mode: self.mode,
            calibration_delay_ms: self.calibration_delay_ms,
            throttle: 0.,
            duty: 0.,
            is_configured: false,
            is_running: false,
        }
    }
}
