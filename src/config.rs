//! Panel geometry, controller timing and the init config of a [`Lcd`](crate::lcd::Lcd)

use crate::command::{MoveDirection, State};

/// Supported panel shapes, `columns x rows`
///
/// The discriminants are fixed identifiers, stable across firmware images.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Geometry {
    #[allow(missing_docs)]
    #[default]
    Lcd16x2 = 0x2,
    #[allow(missing_docs)]
    Lcd16x4 = 0x3,
    #[allow(missing_docs)]
    Lcd20x2 = 0x4,
    #[allow(missing_docs)]
    Lcd20x4 = 0x5,
    #[allow(missing_docs)]
    Lcd40x2 = 0x6,
}

/// Panels grouped by the DDRAM layout of their rows
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryClass {
    /// 16 column panels, row 2 and 3 continue right after 16 cells
    Narrow,
    /// 20 and 40 column panels, row 2 and 3 continue right after 20 cells
    Wide,
}

const NARROW_ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x10, 0x50];
const WIDE_ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

impl Geometry {
    /// Visible columns
    pub const fn columns(self) -> u8 {
        match self {
            Geometry::Lcd16x2 | Geometry::Lcd16x4 => 16,
            Geometry::Lcd20x2 | Geometry::Lcd20x4 => 20,
            Geometry::Lcd40x2 => 40,
        }
    }

    /// Visible rows
    pub const fn rows(self) -> u8 {
        match self {
            Geometry::Lcd16x2 | Geometry::Lcd20x2 | Geometry::Lcd40x2 => 2,
            Geometry::Lcd16x4 | Geometry::Lcd20x4 => 4,
        }
    }

    #[allow(missing_docs)]
    pub const fn class(self) -> GeometryClass {
        match self {
            Geometry::Lcd16x2 | Geometry::Lcd16x4 => GeometryClass::Narrow,
            _ => GeometryClass::Wide,
        }
    }

    /// DDRAM address of the first cell of each row
    ///
    /// The table always has 4 entries, on a 2 row panel the last two
    /// point into DDRAM that is not on screen.
    pub const fn row_offsets(self) -> &'static [u8; 4] {
        match self.class() {
            GeometryClass::Narrow => &NARROW_ROW_OFFSETS,
            GeometryClass::Wide => &WIDE_ROW_OFFSETS,
        }
    }
}

impl From<Geometry> for u8 {
    fn from(geometry: Geometry) -> Self {
        geometry as u8
    }
}

impl TryFrom<u8> for Geometry {
    /// the unknown identifier
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x2 => Ok(Geometry::Lcd16x2),
            0x3 => Ok(Geometry::Lcd16x4),
            0x4 => Ok(Geometry::Lcd20x2),
            0x5 => Ok(Geometry::Lcd20x4),
            0x6 => Ok(Geometry::Lcd40x2),
            other => Err(other),
        }
    }
}

/// Settle times (in microseconds) the driver waits after each step
///
/// There is no busy flag to poll on a write-only backpack, so every command
/// is followed by a fixed wait. Values lower than [`Timing::MINIMUM`] are
/// raised to it before use, see [`Timing::clamped`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// wait after power on, before the first command
    pub power_on_us: u32,
    /// wait after each of the three interface reset commands
    pub interface_reset_us: [u32; 3],
    /// wait after switching to 4 bit mode
    pub four_bit_switch_us: u32,
    /// wait after an ordinary command
    pub command_us: u32,
    /// wait after clear display or return home
    pub clear_us: u32,
}

impl Timing {
    /// Lower bounds from the HD44780 datasheet
    pub const MINIMUM: Timing = Timing {
        power_on_us: 40_000,
        interface_reset_us: [4_100, 100, 100],
        four_bit_switch_us: 40,
        command_us: 40,
        clear_us: 1_520,
    };

    /// Generous defaults, they also cover slow clones of the controller
    pub const DEFAULT: Timing = Timing {
        power_on_us: 50_000,
        interface_reset_us: [5_000, 5_000, 2_000],
        four_bit_switch_us: 5_000,
        command_us: 1_000,
        clear_us: 2_000,
    };

    /// Whether every field is at least its datasheet minimum
    pub fn is_within_datasheet(&self) -> bool {
        self.clamped() == *self
    }

    /// Copy of `self` with every field raised to at least [`Timing::MINIMUM`]
    pub fn clamped(&self) -> Timing {
        let min = Timing::MINIMUM;
        let mut interface_reset_us = self.interface_reset_us;
        interface_reset_us
            .iter_mut()
            .zip(min.interface_reset_us)
            .for_each(|(us, min_us)| *us = (*us).max(min_us));

        Timing {
            power_on_us: self.power_on_us.max(min.power_on_us),
            interface_reset_us,
            four_bit_switch_us: self.four_bit_switch_us.max(min.four_bit_switch_us),
            command_us: self.command_us.max(min.command_us),
            clear_us: self.clear_us.max(min.clear_us),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::DEFAULT
    }
}

/// [`Config`] is the init config of a [`Lcd`](crate::lcd::Lcd)
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    geometry: Geometry,
    timing: Timing,
    cursor: State,
    cursor_blink: State,
    direction: MoveDirection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            timing: Timing::default(),
            cursor: State::Off,
            cursor_blink: State::Off,
            direction: MoveDirection::LeftToRight,
        }
    }
}

#[allow(missing_docs)]
impl Config {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            ..Default::default()
        }
    }

    pub fn get_geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn set_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn get_timing(&self) -> Timing {
        self.timing
    }

    pub fn set_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// cursor underline once the display is on, off unless set
    pub fn get_cursor_state(&self) -> State {
        self.cursor
    }

    pub fn set_cursor_state(mut self, cursor: State) -> Self {
        self.cursor = cursor;
        self
    }

    /// cursor blink once the display is on, off unless set
    pub fn get_cursor_blink(&self) -> State {
        self.cursor_blink
    }

    pub fn set_cursor_blink(mut self, blink: State) -> Self {
        self.cursor_blink = blink;
        self
    }

    pub fn get_direction(&self) -> MoveDirection {
        self.direction
    }

    pub fn set_direction(mut self, dir: MoveDirection) -> Self {
        self.direction = dir;
        self
    }
}
