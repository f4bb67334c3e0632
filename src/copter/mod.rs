//! Quad X flight controller.
//!
//! Maneuvers set a hover throttle plus a (forward, right, clockwise) demand
//! that [`mix`] splits across the four motors without changing total thrust.

mod builder;
pub use builder::{Builder, Config};

mod control;
pub use control::{mix, P};

mod motor;
pub use motor::{Motors, Position, Spin};

use embedded_hal::blocking::delay::DelayMs;
use nalgebra::Vector3;
use num_traits::Float;

use crate::esc::clamp_throttle;
use crate::hal::PwmChannel;
use crate::sensor::{self, AttitudeSensor, InertialSensor};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Disarmed,
    Armed,
}

/// Drives four ESCs from one attitude sensor.
pub struct FlightController<C, I> {
    motors: Motors<C>,
    sensor: AttitudeSensor<I>,
    config: Config,
    state: State,
    hover: f32,
    demand: Vector3<f32>,
}

impl<C, I> FlightController<C, I>
where
    C: PwmChannel,
    I: InertialSensor,
{
    /// Create a controller with the default [`Config`].
    pub fn new(motors: Motors<C>, sensor: AttitudeSensor<I>) -> Self {
        Builder::default().build(motors, sensor)
    }

    /// Initialize every ESC, front left first.
    ///
    /// Stops at the first failure. ESCs initialized before it stay claimed.
    pub fn init(&mut self) -> Result<(), Error<C::Error, I::Error>> {
        self.require(State::Uninitialized)?;

        for position in Position::ALL {
            self.motors[position]
                .initialize()
                .map_err(|error| Error::HardwareFault(position, error))?;
        }

        self.state = State::Disarmed;
        log::info!("motors initialized");
        Ok(())
    }

    /// Start every ESC. On failure some motors may be running, call
    /// [`kill`](Self::kill) before retrying.
    pub fn arm(&mut self) -> Result<(), Error<C::Error, I::Error>> {
        self.require(State::Disarmed)?;

        for position in Position::ALL {
            self.motors[position]
                .start()
                .map_err(|error| Error::HardwareFault(position, error))?;
        }

        self.hover = 0.;
        self.demand = Vector3::zeros();
        self.state = State::Armed;
        log::info!("motors armed");
        Ok(())
    }

    /// Stop every ESC, even if some of them fail.
    ///
    /// Returns the first failure after all four were attempted. The state
    /// only changes to disarmed when every motor stopped.
    pub fn kill(&mut self) -> Result<(), Error<C::Error, I::Error>> {
        if self.state == State::Uninitialized {
            return Err(Error::InvalidState(self.state));
        }

        let mut result = Ok(());
        for position in Position::ALL {
            if let Err(error) = self.motors[position].stop() {
                log::error!("failed to stop {:?} motor", position);
                if result.is_ok() {
                    result = Err(Error::HardwareFault(position, error));
                }
            }
        }
        result?;

        self.hover = 0.;
        self.demand = Vector3::zeros();
        self.state = State::Disarmed;
        log::info!("motors killed");
        Ok(())
    }

    /// Set the same throttle on every motor and drop any maneuver in progress.
    pub fn throttle_all(&mut self, percentage: f32) -> Result<(), Error<C::Error, I::Error>> {
        self.require(State::Armed)?;

        self.apply(clamp_throttle(percentage), Vector3::zeros())
    }

    /// Pitch nose down around the hover throttle.
    pub fn forward(&mut self, speed: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_delta, speed);
        self.maneuver(0, delta)
    }

    pub fn reverse(&mut self, speed: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_delta, speed);
        self.maneuver(0, -delta)
    }

    /// Roll right side down.
    pub fn right(&mut self, speed: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_delta, speed);
        self.maneuver(1, delta)
    }

    pub fn left(&mut self, speed: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_delta, speed);
        self.maneuver(1, -delta)
    }

    /// Turn clockwise seen from above by speeding up the clockwise pair.
    pub fn yaw_cw(&mut self, rate: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_yaw_delta, rate);
        self.maneuver(2, delta)
    }

    pub fn yaw_ccw(&mut self, rate: f32) -> Result<(), Error<C::Error, I::Error>> {
        let delta = delta(self.config.max_yaw_delta, rate);
        self.maneuver(2, -delta)
    }

    /// Level the aircraft using the attitude sensor.
    ///
    /// Each cycle updates the sensor and, unless pitch and roll are within
    /// tolerance, applies a proportional pitch and roll demand and waits one
    /// period. Returns the number of cycles it took to level out. Yaw is left
    /// alone.
    pub fn reorient<D>(&mut self, delay: &mut D) -> Result<u16, Error<C::Error, I::Error>>
    where
        D: DelayMs<u16>,
    {
        self.require(State::Armed)?;
        if !self.sensor.is_calibrated() {
            return Err(Error::Sensor(sensor::Error::Uncalibrated));
        }

        let Config {
            level,
            max_correction,
            tolerance,
            max_cycles,
            period_ms,
            ..
        } = self.config;
        let limit = Float::abs(max_correction);

        for cycle in 1..=max_cycles {
            self.sensor.update()?;
            let pitch = self.sensor.pitch();
            let roll = self.sensor.roll();

            if !pitch.is_finite() || !roll.is_finite() {
                log::warn!("skipping leveling cycle {} on a non-finite attitude", cycle);
                delay.delay_ms(period_ms);
                continue;
            }

            let mut demand = self.demand;
            if Float::abs(pitch) <= tolerance && Float::abs(roll) <= tolerance {
                demand.x = 0.;
                demand.y = 0.;
                self.apply(self.hover, demand)?;

                log::debug!("level after {} cycles", cycle);
                return Ok(cycle);
            }

            // Nose up needs a forward demand, right side down a left one
            demand.x = -level.control(0., pitch).clamp(-limit, limit);
            demand.y = level.control(0., roll).clamp(-limit, limit);
            self.apply(self.hover, demand)?;

            log::debug!(
                "leveling cycle {}: pitch {} roll {}, demand {:?}",
                cycle,
                pitch,
                roll,
                self.demand.as_slice()
            );
            delay.delay_ms(period_ms);
        }

        let attitude = self.sensor.attitude();
        log::warn!(
            "not level after {} cycles, attitude {:?}",
            max_cycles,
            attitude.as_slice()
        );
        Err(Error::ConvergenceFailure(attitude))
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The hover throttle maneuvers are mixed around.
    pub fn hover(&self) -> f32 {
        self.hover
    }

    /// The (forward, right, clockwise) demand in throttle points.
    pub fn demand(&self) -> Vector3<f32> {
        self.demand
    }

    /// The last throttle the motor at `position` accepted.
    pub fn throttle(&self, position: Position) -> f32 {
        self.motors[position].throttle()
    }

    pub fn motors(&self) -> &Motors<C> {
        &self.motors
    }

    pub fn sensor(&self) -> &AttitudeSensor<I> {
        &self.sensor
    }

    /// Used to initialize and calibrate the sensor.
    pub fn sensor_mut(&mut self) -> &mut AttitudeSensor<I> {
        &mut self.sensor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn require(&self, state: State) -> Result<(), Error<C::Error, I::Error>> {
        if self.state == state {
            Ok(())
        } else {
            Err(Error::InvalidState(self.state))
        }
    }

    fn maneuver(&mut self, axis: usize, delta: f32) -> Result<(), Error<C::Error, I::Error>> {
        self.require(State::Armed)?;

        let mut demand = self.demand;
        demand[axis] = delta;
        self.apply(self.hover, demand)
    }

    /// Write the mixed throttles, front left first, stopping at the first
    /// motor that fails. `hover` and `demand` are only kept once every motor
    /// accepted its throttle.
    fn apply(
        &mut self,
        hover: f32,
        demand: Vector3<f32>,
    ) -> Result<(), Error<C::Error, I::Error>> {
        let throttles = mix(hover, &demand);

        for (position, throttle) in Position::ALL.into_iter().zip(throttles) {
            self.motors[position]
                .set_throttle(throttle)
                .map_err(|error| Error::HardwareFault(position, error))?;
        }

        self.hover = hover;
        self.demand = demand;

        log::debug!("throttle {:?}", throttles);
        Ok(())
    }
}

/// Throttle points for a speed percentage.
fn delta(max_delta: f32, speed: f32) -> f32 {
    max_delta * clamp_throttle(speed) / 100.
}
