//! GPIO / peripheral pin assignments for the door-mode board (ESP32-S3).
//!
//! Single source of truth; the device binary references this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Buttons (active low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_A_GPIO: i32 = 4;
pub const BUTTON_B_GPIO: i32 = 5;
pub const BUTTON_C_GPIO: i32 = 6;

/// Button sampling period for the input task.
pub const BUTTON_POLL_MS: u64 = 5;

// ---------------------------------------------------------------------------
// Mode indicator (discrete R/G/B LEDs)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// APA102 strip (SPI2, write-only)
// ---------------------------------------------------------------------------

pub const STRIP_SCLK_GPIO: i32 = 36;
pub const STRIP_MOSI_GPIO: i32 = 35;
pub const STRIP_SPI_HZ: u32 = 4_000_000;

// ---------------------------------------------------------------------------
// HT16K33 display (I2C0)
// ---------------------------------------------------------------------------

pub const DISPLAY_SDA_GPIO: i32 = 8;
pub const DISPLAY_SCL_GPIO: i32 = 9;
pub const DISPLAY_I2C_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Piezo speaker (LEDC square wave)
// ---------------------------------------------------------------------------

pub const SPEAKER_GPIO: i32 = 14;
/// LEDC timer and channel reserved for the speaker.
pub const SPEAKER_LEDC_TIMER: u32 = 0;
pub const SPEAKER_LEDC_CHANNEL: u32 = 0;
