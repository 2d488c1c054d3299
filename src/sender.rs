//! Built-in sender
//!
//! A sender turns [`Command`]s into bus traffic. The crate ships [`I2cSender`], which drives
//! a PCF8574 backpack through any [`Transport`]; [`HalI2c`] makes every
//! [`embedded_hal::i2c::I2c`] bus a [`Transport`].
//!
//! If you want to create a new sender, you will need to implement [`SendCommand`] trait

use embedded_hal::delay::DelayNs;

use crate::command::{Command, State};

mod hal_i2c;
mod i2c_sender;

pub use hal_i2c::{AddressMode, HalI2c};
pub use i2c_sender::I2cSender;

/// Blocking "put these bytes on the wire" capability
///
/// One call is one attempt: implementations must not retry on their own.
pub trait Transport {
    /// Whatever the bus reports when a transfer fails
    type Error;

    /// Transmit `bytes` to the device at `address`, giving up after `timeout_ms`
    fn transmit(&mut self, address: u8, bytes: &[u8], timeout_ms: u32) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], timeout_ms: u32) -> Result<(), Self::Error> {
        (**self).transmit(address, bytes, timeout_ms)
    }
}

/// [`SendCommand`] is the trait a sender should implement to communicate with the hardware
pub trait SendCommand {
    /// Error of the underlying bus
    type Error;

    /// Put one [`Command`] on the bus
    fn send(&mut self, command: impl Into<Command>) -> Result<(), Self::Error>;

    /// Send command, then block for `settle_us`, the time the controller needs to execute it
    ///
    /// Nothing is waited for if sending fails.
    fn send_and_wait(
        &mut self,
        command: impl Into<Command>,
        delayer: &mut impl DelayNs,
        settle_us: u32,
    ) -> Result<(), Self::Error> {
        self.send(command)?;
        delayer.delay_us(settle_us);
        Ok(())
    }

    /// Get the current backlight
    fn get_backlight(&self) -> State;

    /// Set the backlight
    ///
    /// Note:
    /// If a driver doesn't support change backlight, just silently bypass it
    fn set_backlight(&mut self, backlight: State) -> Result<(), Self::Error>;
}
