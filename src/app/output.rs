//! Output stage: the three visual effectors behind one [`OutputPort`].
//!
//! Every effector is optional. An absent one is skipped at debug level;
//! a failing one is logged and the others still render.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::drivers::indicator::IndicatorLight;
use crate::drivers::led_patterns::STRIP_LEN;
use crate::error::PeripheralError;

use super::commands::{OutputCommand, StripFrame};
use super::ports::{LedStrip, OutputPort, TextDisplay};

pub struct OutputSink<P, S, D> {
    indicator: Option<IndicatorLight<P>>,
    strip: Option<S>,
    display: Option<D>,
    /// Strip brightness applied at init.
    idle_brightness: u8,
}

/// Keeps the first error, logs every one.
fn note(first: &mut Option<PeripheralError>, result: Result<(), PeripheralError>) {
    if let Err(e) = result {
        warn!("output: {e}");
        first.get_or_insert(e);
    }
}

fn finish(first: Option<PeripheralError>) -> Result<(), PeripheralError> {
    first.map_or(Ok(()), Err)
}

fn write_frame<S: LedStrip>(strip: &mut S, frame: &StripFrame) -> Result<(), PeripheralError> {
    let colors = strip.write(&frame.colors());
    let brightness = strip.set_brightness(frame.brightness());
    colors.and(brightness)
}

impl<P, S, D> OutputSink<P, S, D>
where
    P: OutputPin,
    S: LedStrip,
    D: TextDisplay,
{
    pub fn new(
        indicator: Option<IndicatorLight<P>>,
        strip: Option<S>,
        display: Option<D>,
        idle_brightness: u8,
    ) -> Self {
        Self {
            indicator,
            strip,
            display,
            idle_brightness,
        }
    }

    pub fn indicator(&self) -> Option<&IndicatorLight<P>> {
        self.indicator.as_ref()
    }

    pub fn strip(&self) -> Option<&S> {
        self.strip.as_ref()
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }
}

impl<P, S, D> OutputPort for OutputSink<P, S, D>
where
    P: OutputPin,
    S: LedStrip,
    D: TextDisplay,
{
    fn init(&mut self) -> Result<(), PeripheralError> {
        let mut first = None;
        if let Some(strip) = &mut self.strip {
            note(&mut first, strip.set_brightness(self.idle_brightness));
        }
        if let Some(display) = &mut self.display {
            note(&mut first, display.set_enabled(true));
            note(&mut first, display.clear());
        }
        finish(first)
    }

    fn render(&mut self, cmd: &OutputCommand) -> Result<(), PeripheralError> {
        let mut first = None;

        if let Some(color) = cmd.indicator {
            match &mut self.indicator {
                Some(ind) => note(&mut first, ind.show(color)),
                None => debug!("output: no indicator, {color:?} skipped"),
            }
        }

        if let Some(frame) = &cmd.strip {
            match &mut self.strip {
                Some(strip) => note(&mut first, write_frame(strip, frame)),
                None => debug!("output: no strip, frame skipped"),
            }
        }

        match &mut self.display {
            Some(display) => {
                let text = cmd.display_text();
                let result = if text.is_empty() {
                    display.clear()
                } else {
                    display.display(text)
                };
                note(&mut first, result);
            }
            None => debug!("output: no display, {} skipped", cmd.mode),
        }

        finish(first)
    }

    fn release(&mut self) -> Result<(), PeripheralError> {
        let mut first = None;
        if let Some(ind) = &mut self.indicator {
            note(&mut first, ind.off());
        }
        if let Some(strip) = &mut self.strip {
            note(&mut first, strip.write(&[(0, 0, 0); STRIP_LEN]));
            note(&mut first, strip.set_brightness(0));
        }
        if let Some(display) = &mut self.display {
            note(&mut first, display.clear());
            note(&mut first, display.set_enabled(false));
        }
        finish(first)
    }
}
