//! HT16K33 four-digit 14-segment alphanumeric display over I2C.
//!
//! ## Commands
//!
//! | Byte          | Meaning                                    |
//! |---------------|--------------------------------------------|
//! | `0x21`        | system oscillator on                       |
//! | `0x80 \| on`  | display setup, bit 0 = display on          |
//! | `0xE0 \| lvl` | dimming, 0..=15                            |
//! | `0x00 ...`    | display RAM write, two bytes per digit     |
//!
//! Text is left-aligned. A `.` folds into the decimal point of the
//! preceding character.

use embedded_hal::i2c::I2c;

use crate::app::ports::TextDisplay;
use crate::error::{Effector, PeripheralError, PeripheralFault};

pub const DEFAULT_ADDRESS: u8 = 0x70;
pub const DIGITS: usize = 4;
pub const MAX_BRIGHTNESS: u8 = 15;

const CMD_OSCILLATOR_ON: u8 = 0x21;
const CMD_DISPLAY_SETUP: u8 = 0x80;
const DISPLAY_ON: u8 = 0x01;
const CMD_DIMMING: u8 = 0xE0;
const RAM_START: u8 = 0x00;

const DECIMAL_POINT: u16 = 0x4000;

const BUS_FAULT: PeripheralError =
    PeripheralError::new(Effector::Display, PeripheralFault::BusWriteFailed);

pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
    enabled: bool,
}

impl<I2C: I2c> Ht16k33<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            enabled: false,
        }
    }

    /// Start the oscillator at full brightness, display blank and off.
    pub fn init(&mut self) -> Result<(), PeripheralError> {
        self.command(CMD_OSCILLATOR_ON)?;
        self.set_dimming(MAX_BRIGHTNESS)?;
        self.write_digits(&[0; DIGITS])?;
        self.set_enabled(false)
    }

    pub fn set_dimming(&mut self, level: u8) -> Result<(), PeripheralError> {
        self.command(CMD_DIMMING | level.min(MAX_BRIGHTNESS))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn command(&mut self, byte: u8) -> Result<(), PeripheralError> {
        self.i2c.write(self.address, &[byte]).map_err(|_| BUS_FAULT)
    }

    fn write_digits(&mut self, digits: &[u16; DIGITS]) -> Result<(), PeripheralError> {
        let mut buf = [0u8; 1 + 2 * DIGITS];
        buf[0] = RAM_START;
        for (i, glyph) in digits.iter().enumerate() {
            buf[1 + 2 * i..3 + 2 * i].copy_from_slice(&glyph.to_le_bytes());
        }
        self.i2c.write(self.address, &buf).map_err(|_| BUS_FAULT)
    }
}

impl<I2C: I2c> TextDisplay for Ht16k33<I2C> {
    fn display(&mut self, text: &str) -> Result<(), PeripheralError> {
        self.write_digits(&encode(text))
    }

    fn clear(&mut self) -> Result<(), PeripheralError> {
        self.write_digits(&[0; DIGITS])
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), PeripheralError> {
        self.command(CMD_DISPLAY_SETUP | if enabled { DISPLAY_ON } else { 0 })?;
        self.enabled = enabled;
        Ok(())
    }
}

/// Lay `text` out over the digits. Characters past the last digit are
/// dropped.
pub fn encode(text: &str) -> [u16; DIGITS] {
    let mut digits = [0u16; DIGITS];
    let mut used = 0;
    for c in text.chars() {
        if c == '.' && used > 0 && digits[used - 1] & DECIMAL_POINT == 0 {
            digits[used - 1] |= DECIMAL_POINT;
            continue;
        }
        if used == DIGITS {
            break;
        }
        digits[used] = glyph(c);
        used += 1;
    }
    digits
}

/// 14-segment pattern for `c`. Lowercase maps to uppercase; unknown
/// characters are blank.
pub fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0' => 0x0C3F,
        '1' => 0x0006,
        '2' => 0x00DB,
        '3' => 0x008F,
        '4' => 0x00E6,
        '5' => 0x2069,
        '6' => 0x00FD,
        '7' => 0x0007,
        '8' => 0x00FF,
        '9' => 0x00EF,
        'A' => 0x00F7,
        'B' => 0x128F,
        'C' => 0x0039,
        'D' => 0x120F,
        'E' => 0x00F9,
        'F' => 0x0071,
        'G' => 0x00BD,
        'H' => 0x00F6,
        'I' => 0x1209,
        'J' => 0x001E,
        'K' => 0x2470,
        'L' => 0x0038,
        'M' => 0x0536,
        'N' => 0x2136,
        'O' => 0x003F,
        'P' => 0x00F3,
        'Q' => 0x203F,
        'R' => 0x20F3,
        'S' => 0x018D,
        'T' => 0x1201,
        'U' => 0x003E,
        'V' => 0x0C30,
        'W' => 0x2836,
        'X' => 0x2D00,
        'Y' => 0x1500,
        'Z' => 0x0C09,
        '-' => 0x00C0,
        '.' => DECIMAL_POINT,
        _ => 0,
    }
}
