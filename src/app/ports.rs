//! Port traits: the hexagonal boundary between the controller and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ModeController (domain)
//! ```
//!
//! Peripheral drivers, the HTTP client, the entropy source and the log /
//! speech / banner sinks implement these traits.  The
//! [`ModeController`](super::service::ModeController) and
//! [`Dispatcher`](crate::dispatcher::Dispatcher) consume them via generics,
//! so the domain core never touches hardware directly.
//!
//! All fallible peripheral ports return [`PeripheralError`]; the caller logs
//! it and carries on with the remaining effectors.

use crate::drivers::led_patterns::Rgb;
use crate::error::{ClassificationError, PeripheralError};

use super::commands::{OutputCommand, ToneLevel};
use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Output effectors (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Addressable LED strip.
pub trait LedStrip {
    /// Write one colour per LED. Shorter slices leave the tail dark.
    fn write(&mut self, colors: &[Rgb]) -> Result<(), PeripheralError>;

    /// Global brightness (0 = dark).
    fn set_brightness(&mut self, level: u8) -> Result<(), PeripheralError>;
}

/// Short alphanumeric text display.
pub trait TextDisplay {
    fn display(&mut self, text: &str) -> Result<(), PeripheralError>;

    fn clear(&mut self) -> Result<(), PeripheralError>;

    fn set_enabled(&mut self, enabled: bool) -> Result<(), PeripheralError>;
}

/// Raw tone generator (PWM speaker).
pub trait ToneOutput {
    fn play(&mut self, frequency_hz: f32) -> Result<(), PeripheralError>;

    fn stop(&mut self) -> Result<(), PeripheralError>;
}

/// The combined output stage driven by the controller.
///
/// Implemented by [`OutputSink`](super::output::OutputSink); tests substitute
/// a recorder.
pub trait OutputPort {
    /// Bring outputs to their idle startup state.
    fn init(&mut self) -> Result<(), PeripheralError>;

    /// Render one transition. Every effector is attempted even if an
    /// earlier one fails; the first failure is returned.
    fn render(&mut self, cmd: &OutputCommand) -> Result<(), PeripheralError>;

    /// Drive everything dark and disable the display.
    fn release(&mut self) -> Result<(), PeripheralError>;
}

/// Fire-and-forget tone slides. Must never block the caller.
pub trait ToneSink {
    fn play_slide(&self, level: ToneLevel);
}

// ───────────────────────────────────────────────────────────────
// Event / announcement sinks (domain → logging, speech, banner)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Text-to-speech announcement. Fire-and-forget.
pub trait SpeechSink {
    fn announce(&mut self, text: &str);
}

/// Startup banner (IP + start time). Fire-and-forget.
pub trait BannerSink {
    fn show_banner(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Network
// ───────────────────────────────────────────────────────────────

/// Raw HTTP response as seen by the classification client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Blocking HTTPS POST.
///
/// Implementations return `Ok` for every response that carried a status
/// line, including non-2xx; only failures before a status arrives are
/// [`ClassificationError::Transport`].
pub trait HttpTransport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, ClassificationError>;
}

/// One classification round trip to run off the dispatch context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Monotonically increasing per controller.
    pub id: u64,
    pub image_uri: String,
}

/// Runs classification requests concurrently and feeds completions back
/// onto the dispatch queue.
pub trait RequestLauncher {
    fn launch(&mut self, request: ClassificationRequest);
}

/// Textual interface addresses, as reported by the network stack
/// (IPv6 may carry a `%zone` suffix).
pub trait NetworkInfo {
    fn addresses(&self) -> Vec<String>;
}

// ───────────────────────────────────────────────────────────────
// Entropy
// ───────────────────────────────────────────────────────────────

/// Non-cryptographic randomness for pattern draws and image selection.
pub trait EntropySource {
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish index in `0..bound`. `bound` must be non-zero.
    fn pick(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "pick from empty range");
        (self.next_u32() as usize) % bound.max(1)
    }
}
