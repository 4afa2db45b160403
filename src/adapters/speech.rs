//! Spoken mode announcements.
//!
//! [`Announcer`] turns `ModeChanged` events into a [`SpeechSink`] call
//! with the new mode's name. No speech engine ships with the device, so
//! [`LogSpeech`] just logs the phrase.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SpeechSink};

pub struct Announcer<S> {
    speech: S,
}

impl<S: SpeechSink> Announcer<S> {
    pub fn new(speech: S) -> Self {
        Self { speech }
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }
}

impl<S: SpeechSink> EventSink for Announcer<S> {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::ModeChanged { to, .. } = event {
            self.speech.announce(to.name());
        }
    }
}

#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechSink for LogSpeech {
    fn announce(&mut self, text: &str) {
        info!("SAY | {text}");
    }
}
