//! Outbound application events.
//!
//! The [`ModeController`](super::service::ModeController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to the console,
//! announce the mode name, etc.

use crate::error::{ClassificationError, PeripheralError};
use crate::fsm::{Mode, Trigger};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial mode).
    Started(Mode),

    /// The mode machine fired a trigger.
    ModeChanged { from: Mode, to: Mode, trigger: Trigger },

    /// ButtonA launched a classification round trip.
    ClassificationRequested { request_id: u64, image_uri: String },

    /// A classification round trip failed; mode left unchanged.
    ClassificationFailed {
        request_id: u64,
        error: ClassificationError,
    },

    /// A completion arrived for a request older than the latest one.
    /// It is still applied.
    StaleClassification { request_id: u64, latest: u64 },

    /// An effector write failed during a transition.
    PeripheralFault(PeripheralError),

    /// Outputs were released on shutdown.
    Released,
}
