use nalgebra::Vector3;
use num_traits::Float;

use super::{Error, InertialSensor, Sample};
use crate::hal::SensorBus;

/// Default I2C address with AD0 pulled low.
pub const ADDRESS: u8 = 0x68;

const SMPLRT_DIV: u8 = 0x19;
const CONFIG: u8 = 0x1a;
const GYRO_CONFIG: u8 = 0x1b;
const ACCEL_CONFIG: u8 = 0x1c;
const ACCEL_XOUT_H: u8 = 0x3b;
const PWR_MGMT_1: u8 = 0x6b;
const WHO_AM_I: u8 = 0x75;

const IDENTITY: u8 = 0x68;

// +/-2g and +/-500dps full scale
const ACCEL_LSB_PER_G: f32 = 16384.;
const GYRO_LSB_PER_DPS: f32 = 65.5;

/// InvenSense MPU-6050 accelerometer and gyro.
///
/// Expects the chip mounted with x forward, y left and z up. Pitch and roll
/// follow the gravity vector, blended with the integrated gyro rates by a
/// complementary filter. Yaw is the integrated gyro z rate.
pub struct Mpu6050<B> {
    bus: B,
    address: u8,
    /// Time between samples in seconds
    sample_period: f32,
    /// Share of the gyro prediction in the pitch and roll estimate (0 ~ 1)
    gyro_weight: f32,
    estimate: Option<Vector3<f32>>,
}

impl<B: SensorBus> Mpu6050<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            address: ADDRESS,
            sample_period: 0.01,
            gyro_weight: 0.98,
            estimate: None,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Seconds between calls to `sample`, also used for the chip's sample rate.
    pub fn with_sample_period(mut self, seconds: f32) -> Self {
        self.sample_period = seconds;
        self
    }

    /// Set to 0 to use the accelerometer tilt alone.
    pub fn with_gyro_weight(mut self, weight: f32) -> Self {
        self.gyro_weight = weight.clamp(0., 1.);
        self
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn sample_rate_divider(&self) -> u8 {
        // 1kHz internal rate with the low pass filter enabled
        let ticks = Float::round(self.sample_period * 1000.) as i32;
        (ticks - 1).clamp(0, 255) as u8
    }
}

impl<B: SensorBus> InertialSensor for Mpu6050<B> {
    type Error = B::Error;

    fn initialize(&mut self) -> Result<(), Error<B::Error>> {
        self.bus.open(self.address)?;

        let found = self.bus.read_register(WHO_AM_I)?;
        if found != IDENTITY {
            log::warn!("no MPU6050 at {:#x}, WHO_AM_I {:#x}", self.address, found);
            return Err(Error::Unavailable { found });
        }

        // Wake up on the x gyro clock
        self.bus.write_register(PWR_MGMT_1, 0x01)?;
        let divider = self.sample_rate_divider();
        self.bus.write_register(SMPLRT_DIV, divider)?;
        // 44Hz low pass
        self.bus.write_register(CONFIG, 0x03)?;
        self.bus.write_register(GYRO_CONFIG, 0x08)?;
        self.bus.write_register(ACCEL_CONFIG, 0x00)?;

        self.estimate = None;

        log::info!("MPU6050 detected at {:#x}", self.address);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, B::Error> {
        self.bus.read_register(register)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), B::Error> {
        self.bus.write_register(register, value)
    }

    fn sample(&mut self) -> Result<Sample, B::Error> {
        let mut buffer = [0; 14];
        self.bus.read_registers(ACCEL_XOUT_H, &mut buffer)?;

        let word = |index: usize| i16::from_be_bytes([buffer[index], buffer[index + 1]]) as f32;
        let accel = Vector3::new(word(0), word(2), word(4)) / ACCEL_LSB_PER_G;
        // Bytes 6 and 7 hold the temperature
        let gyro = Vector3::new(word(8), word(10), word(12)) / GYRO_LSB_PER_DPS;

        let tilt_pitch = Float::atan2(
            accel.x,
            Float::sqrt(accel.y * accel.y + accel.z * accel.z),
        )
        .to_degrees();
        let tilt_roll = Float::atan2(accel.y, accel.z).to_degrees();

        // Body rates in pitch (nose up), roll (right down), yaw (clockwise)
        let rates = Vector3::new(-gyro.y, gyro.x, -gyro.z);

        let estimate = match self.estimate {
            Some(previous) => {
                let predicted = previous + rates * self.sample_period;
                let w = self.gyro_weight;
                Vector3::new(
                    w * predicted.x + (1. - w) * tilt_pitch,
                    w * predicted.y + (1. - w) * tilt_roll,
                    predicted.z,
                )
            }
            None => Vector3::new(tilt_pitch, tilt_roll, 0.),
        };
        self.estimate = Some(estimate);

        Ok(Sample {
            attitude: estimate,
            acceleration: Vector3::new(accel.z, accel.x, accel.y),
        })
    }
}
