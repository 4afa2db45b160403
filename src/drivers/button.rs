//! Polled, debounced push-button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups. Each button is sampled from
//! the input task at a fixed rate; `poll()` runs the debounce state machine
//! and reports clean press / release edges.
//!
//! ## Debounce
//!
//! | State        | Leaves when                              | Reports     |
//! |--------------|------------------------------------------|-------------|
//! | Released     | pin reads pressed                        | —           |
//! | DebounceDown | still pressed after `DEBOUNCE_MS`        | `pressed`   |
//! | Pressed      | pin reads released                       | —           |
//! | DebounceUp   | still released after `DEBOUNCE_MS`       | `released`  |
//!
//! A bounce back to the old level during a debounce window cancels it.

use embedded_hal::digital::InputPin;
use log::debug;

use crate::events::{ButtonId, ControllerEvent, EventQueue};

pub const DEBOUNCE_MS: u32 = 30;

/// A debounced edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEdge {
    pub id: ButtonId,
    pub pressed: bool,
}

impl ButtonEdge {
    pub fn into_event(self) -> ControllerEvent {
        ControllerEvent::Button {
            id: self.id,
            pressed: self.pressed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Released,
    DebounceDown { since_ms: u32 },
    Pressed,
    DebounceUp { since_ms: u32 },
}

pub struct ButtonDriver<P> {
    id: ButtonId,
    pin: P,
    state: DebounceState,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(id: ButtonId, pin: P) -> Self {
        Self {
            id,
            pin,
            state: DebounceState::Released,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Sample the pin. `now_ms` is monotonic milliseconds (wrapping).
    pub fn poll(&mut self, now_ms: u32) -> Option<ButtonEdge> {
        let down = match self.pin.is_low() {
            Ok(level) => level,
            Err(_) => {
                debug!("button {:?}: read failed, sample skipped", self.id);
                return None;
            }
        };

        match self.state {
            DebounceState::Released => {
                if down {
                    self.state = DebounceState::DebounceDown { since_ms: now_ms };
                }
                None
            }

            DebounceState::DebounceDown { since_ms } => {
                if !down {
                    self.state = DebounceState::Released;
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = DebounceState::Pressed;
                    return Some(self.edge(true));
                }
                None
            }

            DebounceState::Pressed => {
                if !down {
                    self.state = DebounceState::DebounceUp { since_ms: now_ms };
                }
                None
            }

            DebounceState::DebounceUp { since_ms } => {
                if down {
                    self.state = DebounceState::Pressed;
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = DebounceState::Released;
                    return Some(self.edge(false));
                }
                None
            }
        }
    }

    fn edge(&self, pressed: bool) -> ButtonEdge {
        ButtonEdge {
            id: self.id,
            pressed,
        }
    }
}

/// The three mode buttons, polled together.
pub struct ButtonPanel<P> {
    buttons: [ButtonDriver<P>; 3],
}

impl<P: InputPin> ButtonPanel<P> {
    pub fn new(a: P, b: P, c: P) -> Self {
        Self {
            buttons: [
                ButtonDriver::new(ButtonId::A, a),
                ButtonDriver::new(ButtonId::B, b),
                ButtonDriver::new(ButtonId::C, c),
            ],
        }
    }

    /// Poll every button and push clean edges onto `queue`.
    ///
    /// Blocks while the queue is full. Returns the number of edges pushed.
    pub fn poll_into(&mut self, now_ms: u32, queue: &EventQueue) -> usize {
        let mut pushed = 0;
        for button in &mut self.buttons {
            if let Some(edge) = button.poll(now_ms) {
                queue.push(edge.into_event());
                pushed += 1;
            }
        }
        pushed
    }
}
