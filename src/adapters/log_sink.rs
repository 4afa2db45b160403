//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode);
            }
            AppEvent::ModeChanged { from, to, trigger } => {
                info!("MODE | {} -> {} | trigger={:?}", from, to, trigger);
            }
            AppEvent::ClassificationRequested {
                request_id,
                image_uri,
            } => {
                info!("CLASSIFY | #{} | image={}", request_id, image_uri);
            }
            AppEvent::ClassificationFailed { request_id, error } => {
                warn!("CLASSIFY | #{} failed | {}", request_id, error);
            }
            AppEvent::StaleClassification { request_id, latest } => {
                info!("CLASSIFY | #{} applied after newer #{}", request_id, latest);
            }
            AppEvent::PeripheralFault(e) => {
                warn!("FAULT | {}", e);
            }
            AppEvent::Released => {
                info!("STOP | outputs released");
            }
        }
    }
}

/// Fans each event out to two sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: &AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
