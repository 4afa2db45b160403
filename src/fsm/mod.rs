//! Mode state machine.
//!
//! ```text
//!            ButtonA                ButtonB (from OUT)
//!   ┌───────────────────▶ DOOR      ┌──────────────┐
//!   │                               ▼              │
//!  any ──ButtonB (not OUT)──▶ OUT ◀─┴──▶ IN ───────┘
//!   │                         ▲          ▲
//!   │        classified negative  classified otherwise
//!   └──────────ButtonC─────────▶ CLEAR
//! ```
//!
//! The transition function is pure. [`Fsm`] is the only mutable record:
//! the current [`Mode`] plus the rainbow direction flag that flips on every
//! DOOR entry.

pub mod states;

use log::debug;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The appliance's single discrete output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Door = 0,
    In = 1,
    Out = 2,
    Clear = 3,
}

impl Mode {
    pub const COUNT: usize = 4;

    /// Convert a raw index back to a `Mode`. Out-of-range values are a
    /// logic error and fall back to `Door` in release builds.
    pub fn from_index(idx: u8) -> Self {
        match idx {
            0 => Self::Door,
            1 => Self::In,
            2 => Self::Out,
            3 => Self::Clear,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Door
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Door => "DOOR",
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Clear => "CLEAR",
        }
    }

    /// Text shown on the alphanumeric display. CLEAR blanks it.
    pub const fn display_text(self) -> &'static str {
        match self {
            Self::Door => "DOOR",
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Clear => "",
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// What the classification verdicts decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationOutcome {
    Negative,
    Neutral,
}

/// Everything that can move the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ButtonA,
    ButtonB,
    ButtonC,
    Classified(ClassificationOutcome),
}

/// Pure transition function.
///
/// ButtonB is keyed on "was OUT" only: DOOR and CLEAR toggle to OUT just
/// like IN does.
pub fn next_mode(current: Mode, trigger: Trigger) -> Mode {
    match trigger {
        Trigger::ButtonA => Mode::Door,
        Trigger::ButtonB if current == Mode::Out => Mode::In,
        Trigger::ButtonB => Mode::Out,
        Trigger::ButtonC => Mode::Clear,
        Trigger::Classified(ClassificationOutcome::Negative) => Mode::Out,
        Trigger::Classified(ClassificationOutcome::Neutral) => Mode::In,
    }
}

// ---------------------------------------------------------------------------
// Transition record
// ---------------------------------------------------------------------------

/// Result of firing one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub trigger: Trigger,
    /// Rainbow direction after the trigger was applied.
    pub strip_forward: bool,
}

/// Mutable machine state: current mode and rainbow direction.
#[derive(Debug, Clone)]
pub struct Fsm {
    current: Mode,
    /// Rainbow direction; starts forward and flips on every ButtonA.
    strip_forward: bool,
    transitions: u64,
}

impl Fsm {
    pub fn new(initial: Mode) -> Self {
        Self {
            current: initial,
            strip_forward: true,
            transitions: 0,
        }
    }

    /// Apply `trigger` and return what happened.
    ///
    /// ButtonA flips the rainbow direction first; the returned
    /// `strip_forward` is the flipped value the DOOR pattern renders with.
    pub fn fire(&mut self, trigger: Trigger) -> Transition {
        let from = self.current;
        let to = next_mode(from, trigger);
        if trigger == Trigger::ButtonA {
            self.strip_forward = !self.strip_forward;
        }
        let strip_forward = self.strip_forward;
        self.current = to;
        self.transitions += 1;
        debug!("fsm: {from} -> {to} on {trigger:?}");
        Transition {
            from,
            to,
            trigger,
            strip_forward,
        }
    }

    pub fn current_state(&self) -> Mode {
        self.current
    }

    /// Current rainbow direction flag.
    pub fn strip_forward(&self) -> bool {
        self.strip_forward
    }

    pub fn transition_count(&self) -> u64 {
        self.transitions
    }
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new(Mode::Door)
    }
}
