use embedded_hal::i2c::I2c;

use super::Transport;

/// How the address given to [`I2cSender`](super::I2cSender) is written
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// plain 7 bit address, e.g. `0x27` for a PCF8574 with all jumpers open
    #[default]
    SevenBit,
    /// address already shifted left by one, e.g. `0x4E` for the same PCF8574
    EightBit,
}

/// [`Transport`] on top of any blocking [`embedded_hal`] I2C bus
///
/// `embedded_hal` buses carry their own timeout, set up together with the peripheral,
/// so the per-transfer timeout is not forwarded.
pub struct HalI2c<I2C> {
    i2c: I2C,
    mode: AddressMode,
}

impl<I2C: I2c> HalI2c<I2C> {
    /// Wrap a bus which gets 7 bit addresses
    pub fn new(i2c: I2C) -> Self {
        Self::with_address_mode(i2c, AddressMode::SevenBit)
    }

    #[allow(missing_docs)]
    pub fn with_address_mode(i2c: I2C, mode: AddressMode) -> Self {
        Self { i2c, mode }
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Mutable access to the bus, e.g. to finish a mock
    pub fn bus(&mut self) -> &mut I2C {
        &mut self.i2c
    }
}

impl<I2C: I2c> Transport for HalI2c<I2C> {
    type Error = I2C::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], _timeout_ms: u32) -> Result<(), Self::Error> {
        let address = match self.mode {
            AddressMode::SevenBit => address,
            AddressMode::EightBit => address >> 1,
        };
        self.i2c.write(address, bytes)
    }
}
