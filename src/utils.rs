//! Common tools

use core::fmt;

use heapless::Vec;

/// The state of a bit,
/// It's either [`BitState::Clear`] to represent a 0
/// or [`BitState::Set`] to represent a 1
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BitState {
    /// Bit is 0
    Clear,
    /// Bit is 1
    Set,
}

impl From<bool> for BitState {
    fn from(value: bool) -> Self {
        match value {
            true => BitState::Set,
            false => BitState::Clear,
        }
    }
}

/// Simple bit ops
///
/// Positions larger than 7 are outside of a byte, they are ignored.
pub trait BitOps {
    #[allow(missing_docs)]
    fn set_bit(&mut self, pos: u8) -> Self;
    #[allow(missing_docs)]
    fn clear_bit(&mut self, pos: u8) -> Self;

    /// Set or clear a bit, depending on `state`
    fn put_bit(&mut self, pos: u8, state: impl Into<BitState>) -> Self
    where
        Self: Sized,
    {
        match state.into() {
            BitState::Set => self.set_bit(pos),
            BitState::Clear => self.clear_bit(pos),
        }
    }
}

impl BitOps for u8 {
    fn set_bit(&mut self, pos: u8) -> Self {
        if let Some(mask) = 1u8.checked_shl(pos as u32) {
            *self |= mask;
        }
        *self
    }

    fn clear_bit(&mut self, pos: u8) -> Self {
        if let Some(mask) = 1u8.checked_shl(pos as u32) {
            *self &= !mask;
        }
        *self
    }
}

/// Split a byte into the two halves the 4 bit bus carries.
///
/// Both halves are returned in the upper 4 bits, which is where
/// the expander wires DB7..DB4.
pub trait Nibbles {
    /// Upper half, kept in place
    fn high_nibble(self) -> u8;
    /// Lower half, moved into the upper 4 bits
    fn low_nibble(self) -> u8;
}

impl Nibbles for u8 {
    fn high_nibble(self) -> u8 {
        self & 0xF0
    }

    fn low_nibble(self) -> u8 {
        (self << 4) & 0xF0
    }
}

/// Character code the controller ROM shows as a full block
const FULL_BLOCK: u8 = 0xFF;

/// The character code `char` is shown as: ASCII as is, anything else as a full block
pub(crate) fn display_byte(char: char) -> u8 {
    match char.is_ascii() {
        true => char as u8,
        false => FULL_BLOCK,
    }
}

/// [`fmt::Write`] sink collecting one display byte per char, at most `N` of them
///
/// Once a char doesn't fit, everything written after it is dropped as well,
/// so the buffer always holds a prefix of the rendered text.
pub(crate) struct Cells<const N: usize> {
    bytes: Vec<u8, N>,
    full: bool,
}

impl<const N: usize> fmt::Write for Cells<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        for char in s.chars() {
            if self.bytes.push(display_byte(char)).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

/// Render `args` into display bytes, cutting off anything past `N` chars
///
/// [`Cells`] never fails, so an error here comes from a `Display` impl inside `args`.
pub(crate) fn render_cells<const N: usize>(
    args: fmt::Arguments<'_>,
) -> Result<Vec<u8, N>, fmt::Error> {
    let mut cells = Cells {
        bytes: Vec::new(),
        full: false,
    };
    fmt::write(&mut cells, args)?;
    Ok(cells.bytes)
}
