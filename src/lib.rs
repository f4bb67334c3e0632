//! # quad-flight
//! A `no_std` flight core for a quad X multirotor.
//!
//! [`hal`] contains the PWM and sensor bus abstractions, with adapters for
//! `embedded-hal` pins and I2C buses.
//!
//! [`Esc`] drives one motor's speed controller over PWM.
//!
//! [`AttitudeSensor`] calibrates and caches readings from an
//! [`InertialSensor`](sensor::InertialSensor) such as the [`Mpu6050`].
//!
//! [`FlightController`] arms the four motors, mixes hover and maneuver demands
//! into per-motor throttle and levels the aircraft from sensor feedback.
//!
//! ```no_run
//! # use quad_flight::{hal::PwmChannel, sensor::InertialSensor};
//! use quad_flight::{AttitudeSensor, Esc, FlightController, Motors};
//!
//! # fn fly<C: PwmChannel, I: InertialSensor>(
//! #     channels: [C; 4],
//! #     imu: I,
//! #     delay: &mut impl embedded_hal::blocking::delay::DelayMs<u16>,
//! # ) -> Result<(), quad_flight::Error<C::Error, I::Error>> {
//! let [fl, fr, bl, br] = channels;
//! let motors = Motors::new(
//!     Esc::new(fl, 17),
//!     Esc::new(fr, 18),
//!     Esc::new(bl, 27),
//!     Esc::new(br, 22),
//! );
//! let mut copter = FlightController::new(motors, AttitudeSensor::new(imu));
//!
//! copter.sensor_mut().initialize()?;
//! copter.sensor_mut().calibrate()?;
//!
//! copter.init()?;
//! copter.arm()?;
//! copter.throttle_all(50.)?;
//! copter.reorient(delay)?;
//! copter.forward(25.)?;
//! copter.kill()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod copter;
pub use copter::{FlightController, Motors, Position, State};

mod error;
pub use error::Error;

pub mod esc;
pub use esc::Esc;

pub mod hal;

pub mod sensor;
pub use sensor::{AttitudeSensor, Mpu6050};

#[cfg(test)]
mod mock;
