/*!
# LCD I2C Driver

Driver for HD44780 character LCDs (16x2, 16x4, 20x2, 20x4, 40x2) sitting behind a
PCF8574 I2C expander "backpack", which wires the panel in 4 bit mode.

The backpack can't read anything back, so the driver runs open loop: every command is
followed by a fixed settle time instead of polling the busy flag. See [`config::Timing`].

Basic Usage:

1. Wrap your bus <br/>
    Any [`embedded_hal::i2c::I2c`] becomes a [`sender::Transport`] with [`sender::HalI2c`],
    or you can implement [`sender::Transport`] for your own bus.
<br/>
<br/>
2. Use [`lcd::Lcd::initialize()`] (or [`lcd::Lcd::new()`] with a [`config::Config`]) to create
    a [`lcd::Lcd`], and initialize LCD hardware
<br/>
<br/>
3. use any methods provide by [`lcd::Lcd`] to control the LCD

```ignore
use lcd_i2c_driver::{config::Geometry, lcd::Lcd, lcd_print_at, sender::HalI2c};

let mut lcd = Lcd::initialize(HalI2c::new(i2c), delay, 0x27, Geometry::Lcd16x2, 10)?;
lcd.print("hello,")?;
lcd_print_at!(lcd, 0, 1, "T={}", 23)?;
```
*/

#![no_std]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod error;
pub mod lcd;
pub mod sender;
mod state;
pub mod utils;

pub use config::{Config, Geometry, Timing};
pub use error::Error;
pub use lcd::Lcd;
