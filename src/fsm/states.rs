//! Side-effect table: what each trigger does to the outputs.
//!
//! The next mode comes from [`next_mode`](super::next_mode); this table says
//! how the outputs follow it.  Button triggers drive every effector;
//! classification triggers only rewrite the display.
//!
//! ```text
//!  Trigger      │ strip          │ indicator │ tone │ display │ classify
//!  ─────────────┼────────────────┼───────────┼──────┼─────────┼─────────
//!  ButtonA      │ ordered (dir)  │ RED       │  —   │ DOOR    │ yes
//!  ButtonB      │ random draw    │ GREEN     │ MED  │ IN/OUT  │ no
//!  ButtonC      │ off, bright 0  │ BLUE      │ HIGH │ blank   │ no
//!  Classified   │  —             │  —        │  —   │ IN/OUT  │ no
//! ```

use crate::app::commands::{IndicatorColor, ToneLevel};

use super::Trigger;

/// How the strip is driven on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripPlan {
    /// Palette in order, direction taken from the transition.
    Ordered,
    /// Independent uniform draws from the palette.
    Random,
    /// All LEDs dark, brightness 0.
    Off,
    /// Strip left untouched.
    Unchanged,
}

/// Static descriptor for one trigger's side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEffects {
    pub name: &'static str,
    pub strip: StripPlan,
    /// `None` leaves the indicator untouched.
    pub indicator: Option<IndicatorColor>,
    pub tone: Option<ToneLevel>,
    pub request_classification: bool,
}

impl TriggerEffects {
    /// True when only the display follows the new mode.
    pub fn display_only(&self) -> bool {
        self.strip == StripPlan::Unchanged && self.indicator.is_none() && self.tone.is_none()
    }
}

const BUTTON_A: TriggerEffects = TriggerEffects {
    name: "ButtonA",
    strip: StripPlan::Ordered,
    indicator: Some(IndicatorColor::Red),
    tone: None,
    request_classification: true,
};

const BUTTON_B: TriggerEffects = TriggerEffects {
    name: "ButtonB",
    strip: StripPlan::Random,
    indicator: Some(IndicatorColor::Green),
    tone: Some(ToneLevel::Med),
    request_classification: false,
};

const BUTTON_C: TriggerEffects = TriggerEffects {
    name: "ButtonC",
    strip: StripPlan::Off,
    indicator: Some(IndicatorColor::Blue),
    tone: Some(ToneLevel::High),
    request_classification: false,
};

const CLASSIFIED: TriggerEffects = TriggerEffects {
    name: "Classified",
    strip: StripPlan::Unchanged,
    indicator: None,
    tone: None,
    request_classification: false,
};

/// Look up the side effects for `trigger`.
pub fn effects_for(trigger: Trigger) -> &'static TriggerEffects {
    match trigger {
        Trigger::ButtonA => &BUTTON_A,
        Trigger::ButtonB => &BUTTON_B,
        Trigger::ButtonC => &BUTTON_C,
        Trigger::Classified(_) => &CLASSIFIED,
    }
}
