use nalgebra::Vector3;

use super::{FlightController, Motors, State, P};
use crate::sensor::AttitudeSensor;

/// Tuning of a [`FlightController`], fixed after construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Throttle points added and removed at full pitch or roll speed.
    pub max_delta: f32,
    /// Throttle points added and removed at full yaw rate.
    pub max_yaw_delta: f32,
    /// Leveling controller, throttle points per degree of tilt.
    pub level: P,
    /// Largest leveling demand on either axis.
    pub max_correction: f32,
    /// Degrees of pitch and roll that count as level.
    pub tolerance: f32,
    pub max_cycles: u16,
    /// Wait between leveling cycles.
    pub period_ms: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_delta: 20.,
            max_yaw_delta: 15.,
            level: P::new(0.5),
            max_correction: 10.,
            tolerance: 1.,
            max_cycles: 200,
            period_ms: 10,
        }
    }
}

#[derive(Default)]
pub struct Builder {
    config: Config,
}

/// Settings given a non-finite value keep their current value.
impl Builder {
    pub fn max_delta(mut self, points: f32) -> Self {
        self.config.max_delta = throttle_points(points, self.config.max_delta);
        self
    }

    pub fn max_yaw_delta(mut self, points: f32) -> Self {
        self.config.max_yaw_delta = throttle_points(points, self.config.max_yaw_delta);
        self
    }

    pub fn level_gain(mut self, kp: f32) -> Self {
        if kp.is_finite() {
            self.config.level = P::new(kp);
        }
        self
    }

    pub fn max_correction(mut self, points: f32) -> Self {
        self.config.max_correction = throttle_points(points, self.config.max_correction);
        self
    }

    pub fn tolerance(mut self, degrees: f32) -> Self {
        if degrees.is_finite() {
            self.config.tolerance = degrees.max(0.);
        }
        self
    }

    /// At least one cycle always runs.
    pub fn max_cycles(mut self, cycles: u16) -> Self {
        self.config.max_cycles = cycles.max(1);
        self
    }

    pub fn period_ms(mut self, ms: u16) -> Self {
        self.config.period_ms = ms;
        self
    }

    pub fn build<C, I>(
        self,
        motors: Motors<C>,
        sensor: AttitudeSensor<I>,
    ) -> FlightController<C, I> {
        FlightController {
            motors,
            sensor,
            config: self.config,
            state: State::Uninitialized,
            hover: 0.,
            demand: Vector3::zeros(),
        }
    }
}

fn throttle_points(points: f32, current: f32) -> f32 {
    if points.is_finite() {
        points.clamp(0., 100.)
    } else {
        current
    }
}
