use nalgebra::Vector3;

use crate::copter::{Position, State};
use crate::sensor;

/// A flight controller error.
///
/// `P` is the PWM channel error and `S` the sensor bus error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error<P, S> {
    /// The PWM channel of the motor at this position failed.
    HardwareFault(Position, P),
    Sensor(sensor::Error<S>),
    /// The operation is not allowed in the current state.
    InvalidState(State),
    /// Self-leveling ran out of correction cycles at this (pitch, roll, yaw).
    ConvergenceFailure(Vector3<f32>),
}

impl<P, S> From<sensor::Error<S>> for Error<P, S> {
    fn from(sensor_error: sensor::Error<S>) -> Self {
        Error::Sensor(sensor_error)
    }
}
