//! APA102 addressable strip over SPI.
//!
//! ## Wire format
//!
//! ```text
//!  start   │ LED 0            │ ... │ LED n-1          │ end
//!  00 00 00 00 │ E0|br  B  G  R │     │ E0|br  B  G  R │ FF × ⌈n/16⌉
//! ```
//!
//! Brightness is the 5-bit global field shared by every LED frame. The
//! whole frame is resent on every colour or brightness change.

use embedded_hal::spi::SpiDevice;

use crate::app::ports::LedStrip;
use crate::drivers::led_patterns::{Rgb, STRIP_LEN};
use crate::error::{Effector, PeripheralError, PeripheralFault};

pub const MAX_BRIGHTNESS: u8 = 31;

const START_FRAME_LEN: usize = 4;
const END_FRAME_LEN: usize = STRIP_LEN.div_ceil(16);
const FRAME_LEN: usize = START_FRAME_LEN + 4 * STRIP_LEN + END_FRAME_LEN;

pub struct Apa102<SPI> {
    spi: SPI,
    colors: [Rgb; STRIP_LEN],
    brightness: u8,
}

impl<SPI: SpiDevice> Apa102<SPI> {
    /// Starts dark at brightness 0. Nothing is sent until the first write.
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            colors: [(0, 0, 0); STRIP_LEN],
            brightness: 0,
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        let header = 0xE0 | (self.brightness & MAX_BRIGHTNESS);
        for (i, &(r, g, b)) in self.colors.iter().enumerate() {
            let at = START_FRAME_LEN + 4 * i;
            buf[at..at + 4].copy_from_slice(&[header, b, g, r]);
        }
        for byte in &mut buf[FRAME_LEN - END_FRAME_LEN..] {
            *byte = 0xFF;
        }
        buf
    }

    fn flush(&mut self) -> Result<(), PeripheralError> {
        let frame = self.encode();
        self.spi
            .write(&frame)
            .map_err(|_| PeripheralError::new(Effector::Strip, PeripheralFault::BusWriteFailed))
    }
}

impl<SPI: SpiDevice> LedStrip for Apa102<SPI> {
    fn write(&mut self, colors: &[Rgb]) -> Result<(), PeripheralError> {
        self.colors = [(0, 0, 0); STRIP_LEN];
        for (slot, color) in self.colors.iter_mut().zip(colors) {
            *slot = *color;
        }
        self.flush()
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), PeripheralError> {
        self.brightness = level.min(MAX_BRIGHTNESS);
        self.flush()
    }
}
