//! Calibrated attitude and acceleration from a single inertial sensor.

use nalgebra::Vector3;

mod mpu6050;
pub use mpu6050::Mpu6050;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// A bus transaction failed.
    Bus(E),
    /// The device answered with an unexpected identity.
    Unavailable { found: u8 },
    /// The sensor was used before a successful `initialize`.
    NotInitialized,
    /// Readings have no calibration baseline yet.
    Uncalibrated,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Bus(error)
    }
}

/// One reading of the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Pitch (nose up), roll (right side down) and yaw (clockwise) in degrees.
    pub attitude: Vector3<f32>,
    /// Up, forward and left acceleration in g.
    pub acceleration: Vector3<f32>,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            attitude: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }
}

/// A sensor chip that can report raw attitude and acceleration.
pub trait InertialSensor {
    type Error;

    /// Establish communication and configure the chip.
    fn initialize(&mut self) -> Result<(), Error<Self::Error>>;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Take one uncalibrated sample.
    fn sample(&mut self) -> Result<Sample, Self::Error>;
}

/// Caches the latest calibrated reading of an [`InertialSensor`].
///
/// Sampling happens only in [`update`](Self::update), so the accessors can be
/// read any number of times within one control cycle.
pub struct AttitudeSensor<I> {
    sensor: I,
    calibration_samples: u16,
    is_initialized: bool,
    offsets: Option<Sample>,
    current: Sample,
}

impl<I: InertialSensor> AttitudeSensor<I> {
    pub fn new(sensor: I) -> Self {
        Self {
            sensor,
            calibration_samples: 1,
            is_initialized: false,
            offsets: None,
            current: Sample::default(),
        }
    }

    /// Average `samples` readings when calibrating.
    pub fn with_calibration_samples(mut self, samples: u16) -> Self {
        self.calibration_samples = samples.max(1);
        self
    }

    pub fn initialize(&mut self) -> Result<(), Error<I::Error>> {
        self.sensor.initialize()?;
        self.is_initialized = true;

        log::info!("attitude sensor initialized");
        Ok(())
    }

    /// Capture the zero baseline. The aircraft must be level and at rest.
    ///
    /// Calling this again replaces the previous baseline.
    pub fn calibrate(&mut self) -> Result<(), Error<I::Error>> {
        if !self.is_initialized {
            return Err(Error::NotInitialized);
        }

        // Running mean, so identical samples reproduce themselves exactly
        let mut mean = Sample::default();
        for n in 1..=self.calibration_samples {
            let sample = self.sensor.sample()?;
            mean.attitude += (sample.attitude - mean.attitude) / n as f32;
            mean.acceleration += (sample.acceleration - mean.acceleration) / n as f32;
        }

        self.offsets = Some(mean);
        self.current = Sample::default();

        log::info!(
            "attitude sensor calibrated, offsets {:?} {:?}",
            mean.attitude.as_slice(),
            mean.acceleration.as_slice()
        );
        Ok(())
    }

    /// Sample the sensor and store the corrected reading.
    pub fn update(&mut self) -> Result<(), Error<I::Error>> {
        if !self.is_initialized {
            return Err(Error::NotInitialized);
        }

        let sample = self.sensor.sample()?;
        self.current = match &self.offsets {
            Some(offsets) => Sample {
                attitude: sample.attitude - offsets.attitude,
                acceleration: sample.acceleration - offsets.acceleration,
            },
            None => sample,
        };

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_calibrated(&self) -> bool {
        self.offsets.is_some()
    }

    pub fn offsets(&self) -> Option<&Sample> {
        self.offsets.as_ref()
    }

    /// The latest reading as (pitch, roll, yaw) in degrees.
    pub fn attitude(&self) -> Vector3<f32> {
        self.current.attitude
    }

    /// The latest reading as (up, forward, left) in g.
    pub fn acceleration(&self) -> Vector3<f32> {
        self.current.acceleration
    }

    pub fn pitch(&self) -> f32 {
        self.current.attitude.x
    }

    pub fn roll(&self) -> f32 {
        self.current.attitude.y
    }

    /// Heading change since calibration. Drifts over long runs.
    pub fn yaw(&self) -> f32 {
        self.current.attitude.z
    }

    pub fn accel_up(&self) -> f32 {
        self.current.acceleration.x
    }

    pub fn accel_forward(&self) -> f32 {
        self.current.acceleration.y
    }

    /// Left is positive.
    pub fn accel_lr(&self) -> f32 {
        self.current.acceleration.z
    }

    pub fn sensor(&self) -> &I {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut I {
        &mut self.sensor
    }
}
