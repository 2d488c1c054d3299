use embedded_hal::delay::DelayNs;

use crate::{
    command::{CommandSet, DataWidth, Font, LineMode, ShiftType, State},
    config::{Config, Geometry},
    error::Error,
    lcd::Lcd,
    sender::{I2cSender, SendCommand, Transport},
    state::LcdState,
};

impl<Sender, Delayer> Lcd<Sender, Delayer>
where
    Sender: SendCommand,
    Delayer: DelayNs,
{
    /// Create a [`Lcd`] driver, and init LCD hardware
    ///
    /// Blocks for the whole power on sequence (about 80 ms with default timing).
    /// The first failed transfer aborts the sequence, the controller is then in an
    /// unknown state and a new [`Lcd`] has to be created.
    pub fn new(
        sender: Sender,
        delayer: Delayer,
        config: Config,
    ) -> Result<Self, Error<Sender::Error>> {
        let timing = config.get_timing().clamped();

        #[cfg(feature = "defmt")]
        if !config.get_timing().is_within_datasheet() {
            defmt::warn!("timing raised to datasheet minimum: {}", timing);
        }

        let mut lcd = Lcd {
            sender,
            delayer,
            config,
            timing,
            state: LcdState::after_init(&config),
        };
        lcd.init()?;

        Ok(lcd)
    }

    // the controller may come up in 8 bit mode or halfway through a 4 bit transfer,
    // so we strictly follow the "initializing by instruction" flow of the datasheet
    fn init(&mut self) -> Result<(), Error<Sender::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("initializing {}", self.config.get_geometry());

        let timing = self.timing;

        self.delayer.delay_us(timing.power_on_us);

        // 3 times, whatever mode it's in, the controller ends up in 8 bit mode
        for settle_us in timing.interface_reset_us {
            self.send_and_wait(CommandSet::INTERFACE_RESET, settle_us)?;
        }

        self.send_and_wait(CommandSet::FOUR_BIT_SWITCH, timing.four_bit_switch_us)?;

        // from here on every byte is two nibbles
        self.send_and_wait(
            CommandSet::FunctionSet(DataWidth::Bit4, LineMode::TwoLine, Font::Font5x8),
            timing.command_us,
        )?;

        self.send_and_wait(
            CommandSet::DisplayOnOff {
                display: State::Off,
                cursor: State::Off,
                cursor_blink: State::Off,
            },
            timing.command_us,
        )?;

        self.clear()?;

        self.send_and_wait(
            CommandSet::EntryModeSet(self.config.get_direction(), ShiftType::CursorOnly),
            timing.command_us,
        )?;

        self.send_and_wait(
            CommandSet::DisplayOnOff {
                display: State::On,
                cursor: self.config.get_cursor_state(),
                cursor_blink: self.config.get_cursor_blink(),
            },
            timing.command_us,
        )?;

        #[cfg(feature = "defmt")]
        defmt::debug!("display on");

        Ok(())
    }
}

impl<T, Delayer> Lcd<I2cSender<T>, Delayer>
where
    T: Transport,
    Delayer: DelayNs,
{
    /// Set up a PCF8574 backpack at `address` and init LCD hardware with default [`Config`]
    ///
    /// `timeout_ms` bounds each bus transfer, not the settle times in between.
    pub fn initialize(
        transport: T,
        delayer: Delayer,
        address: u8,
        geometry: Geometry,
        timeout_ms: u32,
    ) -> Result<Self, Error<T::Error>> {
        let sender = I2cSender::new(transport, address, timeout_ms);
        Lcd::new(sender, delayer, Config::new(geometry))
    }
}
