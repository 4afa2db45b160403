//! Peripheral drivers, generic over `embedded-hal` 1.0 traits.

pub mod apa102;
pub mod button;
pub mod ht16k33;
pub mod indicator;
pub mod led_patterns;
pub mod tone;
