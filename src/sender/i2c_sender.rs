use crate::{
    command::{Command, RegisterSelection, State},
    utils::{BitOps, Nibbles},
};

use super::{SendCommand, Transport};

// I2C to parallel:
// P7 -> P0
// DB7/DB6/DB5/DB4/BL/EN/RW/RS
const RS_BIT: u8 = 0;
const EN_BIT: u8 = 2;
const BL_BIT: u8 = 3;

/// Sender for HD44780 panels behind a PCF8574 I2C expander, wired in 4 bit mode
///
/// Every byte goes out as one 4 byte transfer: high nibble with enable pulse,
/// then low nibble with enable pulse. RW stays low, nothing is ever read back.
pub struct I2cSender<T: Transport> {
    transport: T,
    addr: u8,
    timeout_ms: u32,
    backlight: State,
}

impl<T: Transport> I2cSender<T> {
    /// `addr` is handed to the [`Transport`] as is, `timeout_ms` bounds every single transfer
    pub fn new(transport: T, addr: u8, timeout_ms: u32) -> Self {
        Self {
            transport,
            addr,
            timeout_ms,
            backlight: State::On,
        }
    }

    /// Backlight state used from the very first transfer
    pub fn with_backlight(mut self, backlight: State) -> Self {
        self.backlight = backlight;
        self
    }

    #[allow(missing_docs)]
    pub fn get_address(&self) -> u8 {
        self.addr
    }

    #[allow(missing_docs)]
    pub fn get_timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Give the transport back
    pub fn release(self) -> T {
        self.transport
    }

    /// Send an instruction byte (RS low)
    pub fn send_command(&mut self, byte: u8) -> Result<(), T::Error> {
        self.send(Command::command(byte))
    }

    /// Send a character code (RS high)
    pub fn send_data(&mut self, byte: u8) -> Result<(), T::Error> {
        self.send(Command::data(byte))
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), T::Error> {
        let result = self.transport.transmit(self.addr, bytes, self.timeout_ms);

        #[cfg(feature = "defmt")]
        if result.is_err() {
            defmt::warn!("transfer of {} bytes to {:#x} failed", bytes.len(), self.addr);
        }

        result
    }
}

impl<T: Transport> SendCommand for I2cSender<T> {
    type Error = T::Error;

    fn send(&mut self, command: impl Into<Command>) -> Result<(), Self::Error> {
        let I2cSeq(seq) = I2cSeq::encode(command.into(), self.backlight);
        self.transmit(&seq)
    }

    fn get_backlight(&self) -> State {
        self.backlight
    }

    fn set_backlight(&mut self, backlight: State) -> Result<(), Self::Error> {
        self.backlight = backlight;

        // enable stays low, so the controller ignores this write
        let mut control = 0u8;
        control.put_bit(BL_BIT, bool::from(backlight));

        self.transmit(&[control])
    }
}

/// The 4 expander writes for one byte: high nibble EN high/low, low nibble EN high/low
#[derive(PartialEq, Debug)]
pub(crate) struct I2cSeq(pub(crate) [u8; 4]);

impl I2cSeq {
    pub(crate) fn encode(command: Command, backlight: State) -> Self {
        let mut control = 0u8;
        control.put_bit(
            RS_BIT,
            command.get_register_selection() == RegisterSelection::Data,
        );
        control.put_bit(BL_BIT, bool::from(backlight));

        let data = command.get_data();
        let [high_enable, high_disable] = pulse(data.high_nibble() | control);
        let [low_enable, low_disable] = pulse(data.low_nibble() | control);

        I2cSeq([high_enable, high_disable, low_enable, low_disable])
    }
}

fn pulse(raw: u8) -> [u8; 2] {
    let mut enable = raw;
    enable.set_bit(EN_BIT);
    let mut disable = raw;
    disable.clear_bit(EN_BIT);
    [enable, disable]
}
