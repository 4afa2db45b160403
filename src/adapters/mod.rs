//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements           | Connects to                    |
//! |------------|----------------------|--------------------------------|
//! | `banner`   | BannerSink           | Serial log output              |
//! | `entropy`  | EntropySource        | ESP32 RNG / host hasher        |
//! | `esp`      | ToneOutput           | ESP32 LEDC, GPIO, SPI, I2C     |
//! |            | NetworkInfo          | ESP-IDF Wi-Fi STA              |
//! | `http`     | HttpTransport        | ESP HTTP client / `ureq`       |
//! | `log_sink` | EventSink            | Serial log output              |
//! | `speech`   | EventSink, SpeechSink| Mode announcements             |
//! | `time`     | DelayNs              | Monotonic clock, thread sleep  |

pub mod banner;
pub mod entropy;
#[cfg(target_os = "espidf")]
pub mod esp;
pub mod http;
pub mod log_sink;
pub mod speech;
pub mod time;
