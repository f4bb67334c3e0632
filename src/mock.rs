//! Recording hardware doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_time::rate::Hertz;
use nalgebra::Vector3;

use crate::hal::{DutyMode, PwmChannel, SensorBus};
use crate::sensor::{self, InertialSensor, Sample};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Claim(u8),
    Configure(u32, DutyMode),
    SetDuty(f32),
    Enable,
    Disable,
}

#[derive(Default)]
struct Channel {
    calls: Vec<Call>,
    duty: f32,
    is_enabled: bool,
    fail_claim: bool,
    fail_set_duty: bool,
    set_duty_budget: Option<usize>,
    fail_enable: bool,
    fail_disable: bool,
}

/// A PWM channel that records every request. Clones share state so a test
/// can keep a handle after moving the channel into an ESC.
#[derive(Clone, Default)]
pub struct MockChannel(Rc<RefCell<Channel>>);

impl MockChannel {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// The duty the hardware is currently generating.
    pub fn duty(&self) -> f32 {
        self.0.borrow().duty
    }

    pub fn is_enabled(&self) -> bool {
        self.0.borrow().is_enabled
    }

    pub fn fail_claim(&self, fail: bool) {
        self.0.borrow_mut().fail_claim = fail;
    }

    pub fn fail_set_duty(&self, fail: bool) {
        self.0.borrow_mut().fail_set_duty = fail;
    }

    /// Accept `writes` more duty writes, then fail every one after.
    pub fn fail_set_duty_after(&self, writes: usize) {
        self.0.borrow_mut().set_duty_budget = Some(writes);
    }

    pub fn fail_enable(&self, fail: bool) {
        self.0.borrow_mut().fail_enable = fail;
    }

    pub fn fail_disable(&self, fail: bool) {
        self.0.borrow_mut().fail_disable = fail;
    }
}

impl PwmChannel for MockChannel {
    type Error = Fault;

    fn claim(&mut self, pin: u8) -> Result<(), Fault> {
        let mut channel = self.0.borrow_mut();
        channel.calls.push(Call::Claim(pin));
        if channel.fail_claim {
            return Err(Fault);
        }
        Ok(())
    }

    fn configure(&mut self, frequency: Hertz, mode: DutyMode) -> Result<(), Fault> {
        self.0
            .borrow_mut()
            .calls
            .push(Call::Configure(frequency.0, mode));
        Ok(())
    }

    fn set_duty(&mut self, duty: f32) -> Result<(), Fault> {
        let mut channel = self.0.borrow_mut();
        channel.calls.push(Call::SetDuty(duty));
        if channel.fail_set_duty {
            return Err(Fault);
        }
        if let Some(budget) = channel.set_duty_budget.as_mut() {
            if *budget == 0 {
                return Err(Fault);
            }
            *budget -= 1;
        }
        channel.duty = duty;
        Ok(())
    }

    fn enable(&mut self) -> Result<(), Fault> {
        let mut channel = self.0.borrow_mut();
        channel.calls.push(Call::Enable);
        if channel.fail_enable {
            return Err(Fault);
        }
        channel.is_enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Fault> {
        let mut channel = self.0.borrow_mut();
        channel.calls.push(Call::Disable);
        if channel.fail_disable {
            return Err(Fault);
        }
        channel.is_enabled = false;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub elapsed_ms: u32,
}

impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.elapsed_ms += ms as u32;
    }
}

/// An inertial sensor replaying scripted samples. The last sample repeats
/// once the script runs out.
#[derive(Default)]
pub struct ScriptedSensor {
    pub samples: VecDeque<Sample>,
    pub last: Sample,
    pub sample_count: usize,
    pub is_present: bool,
}

impl ScriptedSensor {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            last: Sample::default(),
            sample_count: 0,
            is_present: true,
        }
    }

    pub fn constant(sample: Sample) -> Self {
        Self::new([sample])
    }
}

impl InertialSensor for ScriptedSensor {
    type Error = Fault;

    fn initialize(&mut self) -> Result<(), sensor::Error<Fault>> {
        if self.is_present {
            Ok(())
        } else {
            Err(sensor::Error::Unavailable { found: 0xff })
        }
    }

    fn read_register(&mut self, _register: u8) -> Result<u8, Fault> {
        Ok(0)
    }

    fn write_register(&mut self, _register: u8, _value: u8) -> Result<(), Fault> {
        Ok(())
    }

    fn sample(&mut self) -> Result<Sample, Fault> {
        self.sample_count += 1;
        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }
        Ok(self.last)
    }
}

/// Build a sample from attitude degrees with level, resting acceleration.
pub fn attitude(pitch: f32, roll: f32, yaw: f32) -> Sample {
    Sample {
        attitude: Vector3::new(pitch, roll, yaw),
        acceleration: Vector3::new(1., 0., 0.),
    }
}

/// A register file behind a [`SensorBus`].
#[derive(Default)]
pub struct RegisterBus {
    pub address: Option<u8>,
    pub registers: BTreeMap<u8, u8>,
    pub writes: Vec<(u8, u8)>,
}

impl RegisterBus {
    pub fn with(registers: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            registers: registers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Store a big endian word at `register`.
    pub fn set_word(&mut self, register: u8, value: i16) {
        let [high, low] = value.to_be_bytes();
        self.registers.insert(register, high);
        self.registers.insert(register + 1, low);
    }
}

impl SensorBus for RegisterBus {
    type Error = Fault;

    fn open(&mut self, address: u8) -> Result<(), Fault> {
        self.address = Some(address);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Fault> {
        self.address.ok_or(Fault)?;
        Ok(self.registers.get(&register).copied().unwrap_or(0))
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Fault> {
        self.address.ok_or(Fault)?;
        self.writes.push((register, value));
        self.registers.insert(register, value);
        Ok(())
    }
}
