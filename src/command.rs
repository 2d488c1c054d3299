//! HD44780 instruction set, as far as a write-only 4 bit bus can use it

use crate::utils::BitOps;

/// Every instruction this driver can put on the bus
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandSet {
    ClearDisplay,
    ReturnHome,
    EntryModeSet(MoveDirection, ShiftType),
    DisplayOnOff {
        display: State,
        cursor: State,
        cursor_blink: State,
    },
    CursorOrDisplayShift(ShiftType, MoveDirection),
    FunctionSet(DataWidth, LineMode, Font),
    SetCGRAM(u8),
    SetDDRAM(u8),
    WriteDataToRAM(u8),
}

impl CommandSet {
    /// Function set in 8 bit mode, the opcode (`0x30`) used to force the controller
    /// into a known interface state right after power on
    pub const INTERFACE_RESET: CommandSet =
        CommandSet::FunctionSet(DataWidth::Bit8, LineMode::OneLine, Font::Font5x8);

    /// Function set in 4 bit mode (`0x20`), only the upper nibble is latched
    /// while the controller still listens in 8 bit mode
    pub const FOUR_BIT_SWITCH: CommandSet =
        CommandSet::FunctionSet(DataWidth::Bit4, LineMode::OneLine, Font::Font5x8);
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveDirection {
    RightToLeft,
    #[default]
    LeftToRight,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftType {
    #[default]
    CursorOnly,
    CursorAndDisplay,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Off,
    #[default]
    On,
}

impl From<State> for bool {
    fn from(state: State) -> Self {
        state == State::On
    }
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWidth {
    #[default]
    Bit4,
    Bit8,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    OneLine,
    #[default]
    TwoLine,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[default]
    Font5x8,
    Font5x11,
}

/// Which register of the controller a byte lands in
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelection {
    /// Instruction register, RS low
    Command,
    /// Data register (DDRAM or CGRAM), RS high
    Data,
}

/// One byte on its way to the controller, with the register it targets
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    rs: RegisterSelection,
    data: u8,
}

impl Command {
    /// A raw instruction byte
    pub fn command(data: u8) -> Self {
        Self {
            rs: RegisterSelection::Command,
            data,
        }
    }

    /// A raw character code
    pub fn data(data: u8) -> Self {
        Self {
            rs: RegisterSelection::Data,
            data,
        }
    }

    #[allow(missing_docs)]
    pub fn get_register_selection(&self) -> RegisterSelection {
        self.rs
    }

    #[allow(missing_docs)]
    pub fn get_data(&self) -> u8 {
        self.data
    }
}

impl From<CommandSet> for Command {
    fn from(command: CommandSet) -> Self {
        match command {
            CommandSet::ClearDisplay => Self::command(0b0000_0001),

            CommandSet::ReturnHome => Self::command(0b0000_0010),

            CommandSet::EntryModeSet(dir, st) => {
                let mut raw_bits: u8 = 0b0000_0100;
                raw_bits.put_bit(1, dir == MoveDirection::LeftToRight);
                raw_bits.put_bit(0, st == ShiftType::CursorAndDisplay);
                Self::command(raw_bits)
            }

            CommandSet::DisplayOnOff {
                display,
                cursor,
                cursor_blink,
            } => {
                let mut raw_bits: u8 = 0b0000_1000;
                raw_bits.put_bit(2, bool::from(display));
                raw_bits.put_bit(1, bool::from(cursor));
                raw_bits.put_bit(0, bool::from(cursor_blink));
                Self::command(raw_bits)
            }

            CommandSet::CursorOrDisplayShift(st, dir) => {
                let mut raw_bits: u8 = 0b0001_0000;
                raw_bits.put_bit(3, st == ShiftType::CursorAndDisplay);
                raw_bits.put_bit(2, dir == MoveDirection::LeftToRight);
                Self::command(raw_bits)
            }

            CommandSet::FunctionSet(width, line, font) => {
                let mut raw_bits: u8 = 0b0010_0000;
                raw_bits.put_bit(4, width == DataWidth::Bit8);
                raw_bits.put_bit(3, line == LineMode::TwoLine);
                raw_bits.put_bit(2, font == Font::Font5x11);
                Self::command(raw_bits)
            }

            // CGRAM address is 6 bits wide
            CommandSet::SetCGRAM(addr) => Self::command(0b0100_0000 | (addr & 0b0011_1111)),

            // no masking: a column past the row end spills into the next address,
            // the same way the controller itself wraps
            CommandSet::SetDDRAM(addr) => Self::command(0b1000_0000 | addr),

            CommandSet::WriteDataToRAM(data) => Self::data(data),
        }
    }
}
