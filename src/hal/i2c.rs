use embedded_hal::blocking::i2c::{Write, WriteRead};

use super::SensorBus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusError<E> {
    /// A transaction was attempted before [`SensorBus::open`].
    NotOpen,
    I2c(E),
}

impl<E> From<E> for BusError<E> {
    fn from(error: E) -> Self {
        BusError::I2c(error)
    }
}

/// A [`SensorBus`] over a blocking `embedded-hal` I2C peripheral.
pub struct I2cBus<I> {
    i2c: I,
    address: Option<u8>,
}

impl<I> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, address: None }
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I, E> SensorBus for I2cBus<I>
where
    I: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = BusError<E>;

    fn open(&mut self, address: u8) -> Result<(), Self::Error> {
        self.address = Some(address);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut byte = [0];
        self.read_registers(register, &mut byte)?;
        Ok(byte[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        let address = self.address.ok_or(BusError::<E>::NotOpen)?;
        self.i2c.write(address, &[register, value])?;
        Ok(())
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let address = self.address.ok_or(BusError::<E>::NotOpen)?;
        self.i2c.write_read(address, &[register], buffer)?;
        Ok(())
    }
}
