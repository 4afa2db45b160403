//! Platform entropy for pattern draws and image selection.
//!
//! - **`target_os = "espidf"`**: hardware RNG via `esp_random()`.
//! - **`not(target_os = "espidf")`**: xorshift seeded from `RandomState`.
//!
//! Neither is used for anything security-sensitive.

use crate::app::ports::EntropySource;

#[cfg(target_os = "espidf")]
#[derive(Debug, Default)]
pub struct PlatformEntropy;

#[cfg(target_os = "espidf")]
impl PlatformEntropy {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl EntropySource for PlatformEntropy {
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random reads the hardware RNG register; no pointers
        // are involved.
        unsafe { esp_idf_svc::sys::esp_random() }
    }
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug)]
pub struct PlatformEntropy {
    state: u64,
}

#[cfg(not(target_os = "espidf"))]
impl PlatformEntropy {
    pub fn new() -> Self {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(0x9E37_79B9_7F4A_7C15);
        Self::seeded(hasher.finish())
    }

    /// Deterministic sequence, for simulation replays.
    pub fn seeded(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0x2545_F491_4F6C_DD1D } else { seed },
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for PlatformEntropy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl EntropySource for PlatformEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }
}
