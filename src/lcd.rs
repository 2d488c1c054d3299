//! The display controller: init sequence, cursor addressing and printing

use core::fmt;

use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, MoveDirection, ShiftType, State},
    config::{Config, Geometry, Timing},
    error::Error,
    sender::{I2cSender, SendCommand, Transport},
    state::LcdState,
    utils::{display_byte, render_cells},
};

mod init;

/// Characters formatted text is cut off at, the width of the widest panel
pub const TEXT_BUFFER_LEN: usize = Geometry::Lcd40x2.columns() as usize;

/// A character LCD which went through the power on sequence
///
/// All operations block until the bus transfers and the settle times are done.
/// There is no locking inside, share it behind a mutex if more than one context prints.
pub struct Lcd<Sender: SendCommand, Delayer: DelayNs> {
    sender: Sender,
    delayer: Delayer,
    config: Config,
    timing: Timing,
    state: LcdState,
}

impl<Sender: SendCommand, Delayer: DelayNs> Lcd<Sender, Delayer> {
    /// Clear entire display and move cursor to (0, 0)
    pub fn clear(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send_and_wait(CommandSet::ClearDisplay, self.timing.clear_us)
    }

    /// Move cursor to (0, 0) and undo any display shift, DDRAM is kept
    pub fn return_home(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send_and_wait(CommandSet::ReturnHome, self.timing.clear_us)
    }

    /// Move cursor to `column` of `row`
    ///
    /// Rows 0..4 are accepted on every panel, on a 2 row panel rows 2 and 3 address
    /// DDRAM outside of the screen. `column` is not checked, past the end of a row
    /// it spills into whatever DDRAM follows.
    pub fn set_cursor(&mut self, column: u8, row: u8) -> Result<(), Error<Sender::Error>> {
        let geometry = self.get_geometry();
        let Some(&row_offset) = geometry.row_offsets().get(row as usize) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("cursor row {} rejected", row);

            return Err(Error::InvalidRow(row));
        };

        #[cfg(feature = "defmt")]
        if row >= geometry.rows() || column >= geometry.columns() {
            defmt::debug!("cursor ({}, {}) is off screen on {}", column, row, geometry);
        }

        self.send(CommandSet::SetDDRAM(row_offset.wrapping_add(column)))
    }

    /// Write `text` from the current cursor position
    ///
    /// ASCII goes out as is, anything else is shown as a full block.
    /// Nothing wraps: text past the row end lands in DDRAM that isn't visible.
    pub fn print(&mut self, text: &str) -> Result<(), Error<Sender::Error>> {
        text.chars().try_for_each(|char| self.write_byte(display_byte(char)))
    }

    /// Render `args` and print it, text longer than [`TEXT_BUFFER_LEN`] chars is cut off
    ///
    /// Rendering finishes before the first byte goes out: if a `Display` impl in `args`
    /// fails, nothing is printed and [`Error::Format`] is returned.
    ///
    /// Usually called through [`lcd_print!`](crate::lcd_print).
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error<Sender::Error>> {
        let cells = render_cells::<TEXT_BUFFER_LEN>(args).map_err(|_| Error::Format)?;
        cells.iter().try_for_each(|&byte| self.write_byte(byte))
    }

    /// Move cursor, then [`Lcd::print_fmt`]
    ///
    /// Usually called through [`lcd_print_at!`](crate::lcd_print_at).
    pub fn print_fmt_at(
        &mut self,
        column: u8,
        row: u8,
        args: fmt::Arguments<'_>,
    ) -> Result<(), Error<Sender::Error>> {
        self.set_cursor(column, row)?;
        self.print_fmt(args)
    }

    /// Write a raw character code at the current cursor position, e.g. a custom graph (0..8)
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error<Sender::Error>> {
        self.send(CommandSet::WriteDataToRAM(byte))
    }

    /// Store a 5x8 custom graph in CGRAM slot `index`
    ///
    /// Only the lower 5 bits of each line are used. Cursor is back at (0, 0) afterwards,
    /// so the next print lands on the display again.
    pub fn write_graph_to_cgram(
        &mut self,
        index: u8,
        graph_data: &[u8; 8],
    ) -> Result<(), Error<Sender::Error>> {
        if index >= 8 {
            return Err(Error::InvalidGraphIndex(index));
        }

        self.send(CommandSet::SetCGRAM(index << 3))?;
        graph_data
            .iter()
            .try_for_each(|&line| self.write_byte(line & 0b0001_1111))?;
        self.send(CommandSet::SetDDRAM(0))
    }

    #[allow(missing_docs)]
    pub fn set_display_state(&mut self, display: State) -> Result<(), Error<Sender::Error>> {
        self.state.set_display_state(display);
        self.update_display_control()
    }

    #[allow(missing_docs)]
    pub fn get_display_state(&self) -> State {
        self.state.get_display_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_state(&mut self, cursor: State) -> Result<(), Error<Sender::Error>> {
        self.state.set_cursor_state(cursor);
        self.update_display_control()
    }

    #[allow(missing_docs)]
    pub fn get_cursor_state(&self) -> State {
        self.state.get_cursor_state()
    }

    #[allow(missing_docs)]
    pub fn set_cursor_blink_state(&mut self, blink: State) -> Result<(), Error<Sender::Error>> {
        self.state.set_cursor_blink(blink);
        self.update_display_control()
    }

    #[allow(missing_docs)]
    pub fn get_cursor_blink_state(&self) -> State {
        self.state.get_cursor_blink()
    }

    /// Which way the cursor moves after each character
    pub fn set_direction(&mut self, dir: MoveDirection) -> Result<(), Error<Sender::Error>> {
        self.state.set_direction(dir);
        self.update_entry_mode()
    }

    #[allow(missing_docs)]
    pub fn get_direction(&self) -> MoveDirection {
        self.state.get_direction()
    }

    /// Whether the whole display shifts along with the cursor after each character
    pub fn set_shift_type(&mut self, shift: ShiftType) -> Result<(), Error<Sender::Error>> {
        self.state.set_shift_type(shift);
        self.update_entry_mode()
    }

    #[allow(missing_docs)]
    pub fn get_shift_type(&self) -> ShiftType {
        self.state.get_shift_type()
    }

    /// Move the cursor, or the whole display, by one cell
    pub fn shift_cursor_or_display(
        &mut self,
        shift_type: ShiftType,
        dir: MoveDirection,
    ) -> Result<(), Error<Sender::Error>> {
        self.send_and_wait(
            CommandSet::CursorOrDisplayShift(shift_type, dir),
            self.timing.command_us,
        )
    }

    /// Note:
    /// Due to driver implementation, this function may have actual effect, or not
    pub fn set_backlight(&mut self, backlight: State) -> Result<(), Error<Sender::Error>> {
        self.sender
            .set_backlight(backlight)
            .map_err(Error::Transport)
    }

    #[allow(missing_docs)]
    pub fn get_backlight(&self) -> State {
        self.sender.get_backlight()
    }

    #[allow(missing_docs)]
    pub fn get_geometry(&self) -> Geometry {
        self.config.get_geometry()
    }

    #[allow(missing_docs)]
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    /// Settle times in use, already raised to the datasheet minimum
    pub fn get_timing(&self) -> Timing {
        self.timing
    }

    /// Give sender and delayer back
    pub fn release(self) -> (Sender, Delayer) {
        (self.sender, self.delayer)
    }

    fn update_display_control(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send_and_wait(
            CommandSet::DisplayOnOff {
                display: self.state.get_display_state(),
                cursor: self.state.get_cursor_state(),
                cursor_blink: self.state.get_cursor_blink(),
            },
            self.timing.command_us,
        )
    }

    fn update_entry_mode(&mut self) -> Result<(), Error<Sender::Error>> {
        self.send_and_wait(
            CommandSet::EntryModeSet(self.state.get_direction(), self.state.get_shift_type()),
            self.timing.command_us,
        )
    }

    // cursor moves and data writes get no extra wait,
    // a 4 byte transfer outlasts their execution time
    fn send(&mut self, command: CommandSet) -> Result<(), Error<Sender::Error>> {
        self.sender.send(command).map_err(Error::Transport)
    }

    fn send_and_wait(
        &mut self,
        command: CommandSet,
        settle_us: u32,
    ) -> Result<(), Error<Sender::Error>> {
        self.sender
            .send_and_wait(command, &mut self.delayer, settle_us)
            .map_err(Error::Transport)
    }
}

impl<T: Transport, Delayer: DelayNs> Lcd<I2cSender<T>, Delayer> {
    /// Bus address the backpack is reached at
    pub fn get_address(&self) -> u8 {
        self.sender.get_address()
    }

    /// Upper bound of a single bus transfer
    pub fn get_timeout_ms(&self) -> u32 {
        self.sender.get_timeout_ms()
    }
}

impl<Sender: SendCommand, Delayer: DelayNs> fmt::Write for Lcd<Sender, Delayer> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}

/// Formatted print at the current cursor position, see [`Lcd::print_fmt`]
///
/// ```ignore
/// lcd_print!(lcd, "T={}", 23)?;
/// ```
#[macro_export]
macro_rules! lcd_print {
    ($lcd:expr, $($arg:tt)*) => {
        $lcd.print_fmt(::core::format_args!($($arg)*))
    };
}

/// Formatted print at `column`, `row`, see [`Lcd::print_fmt_at`]
///
/// ```ignore
/// lcd_print_at!(lcd, 0, 1, "T={}", 23)?;
/// ```
#[macro_export]
macro_rules! lcd_print_at {
    ($lcd:expr, $column:expr, $row:expr, $($arg:tt)*) => {
        $lcd.print_fmt_at($column, $row, ::core::format_args!($($arg)*))
    };
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use core::{cell::RefCell, fmt::Write};
    use std::{rc::Rc, vec, vec::Vec};

    use super::*;
    use crate::command::RegisterSelection;

    #[derive(Clone, PartialEq, Debug)]
    pub(crate) enum Event {
        Write(u8, Vec<u8>),
        DelayUs(u32),
    }

    pub(crate) type Log = Rc<RefCell<Vec<Event>>>;

    pub(crate) struct Bus {
        pub(crate) log: Log,
        pub(crate) fail_after: Option<usize>,
    }

    impl Transport for Bus {
        type Error = &'static str;

        fn transmit(&mut self, address: u8, bytes: &[u8], _timeout_ms: u32) -> Result<(), Self::Error> {
            if let Some(left) = self.fail_after.as_mut() {
                if *left == 0 {
                    return Err("nak");
                }
                *left -= 1;
            }
            self.log
                .borrow_mut()
                .push(Event::Write(address, bytes.to_vec()));
            Ok(())
        }
    }

    pub(crate) struct Clock {
        pub(crate) log: Log,
    }

    impl DelayNs for Clock {
        fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::DelayUs(ns.div_ceil(1_000)));
        }

        fn delay_us(&mut self, us: u32) {
            self.log.borrow_mut().push(Event::DelayUs(us));
        }
    }

    pub(crate) type TestLcd = Lcd<I2cSender<Bus>, Clock>;

    pub(crate) fn bus_and_clock(fail_after: Option<usize>) -> (Bus, Clock, Log) {
        let log: Log = Rc::default();
        let bus = Bus {
            log: log.clone(),
            fail_after,
        };
        let clock = Clock { log: log.clone() };
        (bus, clock, log)
    }

    /// An initialized lcd with an empty log
    pub(crate) fn fixture(geometry: Geometry) -> (TestLcd, Log) {
        let (bus, clock, log) = bus_and_clock(None);
        let lcd = Lcd::initialize(bus, clock, 0x4E, geometry, 10).unwrap();
        log.borrow_mut().clear();
        (lcd, log)
    }

    /// Turn the 4 byte transfers back into (register, byte)
    pub(crate) fn decode(log: &Log) -> Vec<(RegisterSelection, u8)> {
        log.borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Write(_, bytes) if bytes.len() == 4 => {
                    let rs = match bytes[0] & 1 {
                        1 => RegisterSelection::Data,
                        _ => RegisterSelection::Command,
                    };
                    Some((rs, (bytes[0] & 0xF0) | (bytes[2] >> 4)))
                }
                _ => None,
            })
            .collect()
    }

    pub(crate) fn commands(log: &Log) -> Vec<u8> {
        decode(log)
            .into_iter()
            .filter(|(rs, _)| *rs == RegisterSelection::Command)
            .map(|(_, byte)| byte)
            .collect()
    }

    pub(crate) fn data(log: &Log) -> Vec<u8> {
        decode(log)
            .into_iter()
            .filter(|(rs, _)| *rs == RegisterSelection::Data)
            .map(|(_, byte)| byte)
            .collect()
    }

    #[test]
    fn set_cursor_uses_row_table_of_geometry_class() {
        for geometry in [
            Geometry::Lcd16x2,
            Geometry::Lcd16x4,
            Geometry::Lcd20x2,
            Geometry::Lcd20x4,
            Geometry::Lcd40x2,
        ] {
            let table: [u8; 4] = match geometry {
                Geometry::Lcd16x2 | Geometry::Lcd16x4 => [0x00, 0x40, 0x10, 0x50],
                _ => [0x00, 0x40, 0x14, 0x54],
            };
            let (mut lcd, log) = fixture(geometry);

            for row in 0..4u8 {
                for column in [0u8, 1, 7, 15] {
                    log.borrow_mut().clear();
                    lcd.set_cursor(column, row).unwrap();
                    assert_eq!(
                        commands(&log),
                        vec![0x80 | (table[row as usize] + column)]
                    );
                }
            }
        }
    }

    #[test]
    fn invalid_row_sends_nothing() {
        let (mut lcd, log) = fixture(Geometry::Lcd20x4);

        assert_eq!(lcd.set_cursor(3, 4), Err(Error::InvalidRow(4)));
        assert_eq!(lcd.set_cursor(0, 255), Err(Error::InvalidRow(255)));
        assert_eq!(
            lcd_print_at!(lcd, 0, 7, "x={}", 1),
            Err(Error::InvalidRow(7))
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn column_overflow_wraps_into_next_row_address() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.set_cursor(0x40, 0).unwrap();
        lcd.set_cursor(0xC0, 1).unwrap();
        // 0x40 + 0xC0 wraps to 0x00
        assert_eq!(commands(&log), vec![0xC0, 0x80]);
    }

    #[test]
    fn clear_waits_before_next_command() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.clear().unwrap();
        lcd.set_cursor(0, 0).unwrap();

        let events = log.borrow();
        assert_eq!(events[0], Event::Write(0x4E, vec![0x0C, 0x08, 0x1C, 0x18]));
        match events[1] {
            Event::DelayUs(us) => assert!(us >= Timing::MINIMUM.clear_us),
            ref other => panic!("expected a delay, got {other:?}"),
        }
        assert!(matches!(events[2], Event::Write(..)));
    }

    #[test]
    fn return_home_waits_like_clear() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.return_home().unwrap();

        assert_eq!(commands(&log), vec![0x02]);
        assert_eq!(log.borrow()[1], Event::DelayUs(Timing::DEFAULT.clear_us));
    }

    #[test]
    fn print_sends_one_data_byte_per_char() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.print("Hi!").unwrap();

        assert_eq!(data(&log), b"Hi!".to_vec());
        assert!(commands(&log).is_empty());
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn print_maps_non_ascii_to_full_block() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.print("°C").unwrap();

        assert_eq!(data(&log), vec![0xFF, b'C']);
    }

    #[test]
    fn print_fmt_truncates_to_buffer() {
        let (mut lcd, log) = fixture(Geometry::Lcd40x2);
        let long = "0123456789";

        lcd_print!(lcd, "{long}{long}{long}{long}{long}").unwrap();

        let sent = data(&log);
        assert_eq!(sent.len(), TEXT_BUFFER_LEN);
        assert_eq!(&sent[..10], long.as_bytes());
        assert_eq!(&sent[30..], long.as_bytes());
    }

    #[test]
    fn print_fmt_cut_is_a_prefix() {
        let (mut lcd, log) = fixture(Geometry::Lcd40x2);
        let head = "abcdefghijklmnopqrstuvwxyz0123456789ABC";

        // 'é' takes the last cell, "X" no longer fits
        lcd_print!(lcd, "{head}{}{}", 'é', "X").unwrap();

        let mut expected = head.as_bytes().to_vec();
        expected.push(0xFF);
        assert_eq!(data(&log), expected);

        // a char past the end is dropped together with everything after it
        log.borrow_mut().clear();
        lcd_print!(lcd, "{head}{}{}{}", 'Z', 'é', "X").unwrap();

        let mut expected = head.as_bytes().to_vec();
        expected.push(b'Z');
        assert_eq!(data(&log), expected);
    }

    #[test]
    fn print_fmt_counts_chars_not_bytes() {
        let (mut lcd, log) = fixture(Geometry::Lcd40x2);

        lcd_print!(lcd, "{}", "é".repeat(50)).unwrap();

        assert_eq!(data(&log), vec![0xFF; TEXT_BUFFER_LEN]);
    }

    #[test]
    fn print_fmt_failing_display_prints_nothing() {
        struct Broken;

        impl fmt::Display for Broken {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        assert_eq!(lcd_print!(lcd, "T={}{}", 23, Broken), Err(Error::Format));
        assert_eq!(
            lcd_print_at!(lcd, 0, 1, "{}", Broken),
            Err(Error::Format)
        );
        // only the cursor move of the second call went out
        assert_eq!(decode(&log), vec![(RegisterSelection::Command, 0xC0)]);
    }

    #[test]
    fn print_fmt_at_moves_cursor_first() {
        let (mut lcd, log) = fixture(Geometry::Lcd20x4);

        lcd_print_at!(lcd, 2, 3, "{}%", 99).unwrap();

        assert_eq!(
            decode(&log),
            vec![
                (RegisterSelection::Command, 0x80 | (0x54 + 2)),
                (RegisterSelection::Data, b'9'),
                (RegisterSelection::Data, b'9'),
                (RegisterSelection::Data, b'%'),
            ]
        );
    }

    #[test]
    fn fmt_write_prints() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        write!(lcd, "{}-{}", 4, 2).unwrap();

        assert_eq!(data(&log), b"4-2".to_vec());
    }

    #[test]
    fn display_control_keeps_other_bits() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.set_cursor_state(State::On).unwrap();
        lcd.set_cursor_blink_state(State::On).unwrap();
        lcd.set_display_state(State::Off).unwrap();
        lcd.set_display_state(State::On).unwrap();

        assert_eq!(commands(&log), vec![0x0E, 0x0F, 0x0B, 0x0F]);
        assert_eq!(lcd.get_cursor_state(), State::On);
        assert_eq!(lcd.get_cursor_blink_state(), State::On);
        assert_eq!(lcd.get_display_state(), State::On);
    }

    #[test]
    fn entry_mode_and_shift() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);

        lcd.set_direction(MoveDirection::RightToLeft).unwrap();
        lcd.set_shift_type(ShiftType::CursorAndDisplay).unwrap();
        lcd.shift_cursor_or_display(ShiftType::CursorAndDisplay, MoveDirection::LeftToRight)
            .unwrap();

        assert_eq!(commands(&log), vec![0x04, 0x05, 0x1C]);
        assert_eq!(lcd.get_direction(), MoveDirection::RightToLeft);
        assert_eq!(lcd.get_shift_type(), ShiftType::CursorAndDisplay);
    }

    #[test]
    fn custom_graph_upload() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);
        let heart = [
            0b00000, 0b00000, 0b01010, 0b11111, 0b01110, 0b00100, 0b00000, 0b11100000,
        ];

        lcd.write_graph_to_cgram(1, &heart).unwrap();

        let mut expected = vec![(RegisterSelection::Command, 0x48)];
        expected.extend(
            heart
                .iter()
                .map(|&line| (RegisterSelection::Data, line & 0x1F)),
        );
        expected.push((RegisterSelection::Command, 0x80));
        assert_eq!(decode(&log), expected);

        log.borrow_mut().clear();
        assert_eq!(
            lcd.write_graph_to_cgram(8, &heart),
            Err(Error::InvalidGraphIndex(8))
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn backlight_switch_is_single_byte() {
        let (mut lcd, log) = fixture(Geometry::Lcd16x2);
        assert_eq!(lcd.get_backlight(), State::On);

        lcd.set_backlight(State::Off).unwrap();
        lcd.write_byte(b'A').unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Write(0x4E, vec![0x00]),
                Event::Write(0x4E, vec![0x45, 0x41, 0x15, 0x11]),
            ]
        );
        assert_eq!(lcd.get_backlight(), State::Off);
    }

    #[test]
    fn handle_keeps_bus_settings() {
        let (lcd, _log) = fixture(Geometry::Lcd20x2);

        assert_eq!(lcd.get_address(), 0x4E);
        assert_eq!(lcd.get_timeout_ms(), 10);
        assert_eq!(lcd.get_geometry(), Geometry::Lcd20x2);
    }
}
