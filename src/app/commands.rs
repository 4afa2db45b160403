//! Output commands produced by the controller.
//!
//! An [`OutputCommand`] is a snapshot of one transition's outputs. It is
//! built once from the new [`Mode`] and handed to the
//! [`OutputSink`](super::output::OutputSink), so every effector renders the
//! same mode.

use crate::drivers::led_patterns::{Rgb, STRIP_LEN};
use crate::fsm::Mode;

/// Which of the three indicator bits is driven high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    Red,
    Green,
    Blue,
}

/// Tone slide intensity. The start frequency is `level × 100 Hz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ToneLevel {
    Low = 1,
    Med = 4,
    High = 8,
}

impl ToneLevel {
    pub const fn start_hz(self) -> f32 {
        (self as u8) as f32 * 100.0
    }
}

/// One full strip write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripFrame {
    /// Colors written at the configured non-zero brightness.
    Lit { colors: [Rgb; STRIP_LEN], brightness: u8 },
    /// All LEDs dark and brightness 0.
    Off,
}

impl StripFrame {
    pub fn colors(&self) -> [Rgb; STRIP_LEN] {
        match self {
            Self::Lit { colors, .. } => *colors,
            Self::Off => [(0, 0, 0); STRIP_LEN],
        }
    }

    pub fn brightness(&self) -> u8 {
        match self {
            Self::Lit { brightness, .. } => *brightness,
            Self::Off => 0,
        }
    }
}

/// Everything one transition writes to the outputs.
///
/// `None` leaves that effector untouched (classification transitions only
/// rewrite the display).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCommand {
    pub mode: Mode,
    pub strip: Option<StripFrame>,
    pub indicator: Option<IndicatorColor>,
}

impl OutputCommand {
    /// A command that only updates the display.
    pub fn display_only(mode: Mode) -> Self {
        Self {
            mode,
            strip: None,
            indicator: None,
        }
    }

    /// Display text always follows the mode; CLEAR blanks the display.
    pub fn display_text(&self) -> &'static str {
        self.mode.display_text()
    }
}
