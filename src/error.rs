//! Unified error types for the door-mode controller.
//!
//! Three families, matching how each is recovered:
//!
//! | Family                | Recovered by                                  |
//! |-----------------------|-----------------------------------------------|
//! | [`PeripheralError`]   | logged; the other effectors still render      |
//! | [`ClassificationError`] | logged; Mode is left unchanged              |
//! | [`ConfigError`]       | fatal at startup                              |
//!
//! The top-level [`Error`] carries startup failures (config, thread spawn)
//! so the binary funnels them through one type with `?`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Peripheral(PeripheralError),
    Classification(ClassificationError),
    Config(ConfigError),
    /// Peripheral acquisition failed at startup.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peripheral(e) => write!(f, "peripheral: {e}"),
            Self::Classification(e) => write!(f, "classification: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Peripheral errors
// ---------------------------------------------------------------------------

/// Which output effector a write was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effector {
    Indicator,
    Strip,
    Display,
    Tone,
}

impl Effector {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Indicator => "indicator",
            Self::Strip => "strip",
            Self::Display => "display",
            Self::Tone => "tone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralFault {
    /// A GPIO level write failed.
    GpioWriteFailed,
    /// An SPI or I2C transaction failed.
    BusWriteFailed,
    /// The tone generator rejected a frequency or stop command.
    ToneWriteFailed,
}

impl fmt::Display for PeripheralFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::BusWriteFailed => write!(f, "bus write failed"),
            Self::ToneWriteFailed => write!(f, "tone write failed"),
        }
    }
}

/// A single effector write failure. Never aborts a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralError {
    pub effector: Effector,
    pub fault: PeripheralFault,
}

impl PeripheralError {
    pub const fn new(effector: Effector, fault: PeripheralFault) -> Self {
        Self { effector, fault }
    }
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.effector.name(), self.fault)
    }
}

impl core::error::Error for PeripheralError {}

impl From<PeripheralError> for Error {
    fn from(e: PeripheralError) -> Self {
        Self::Peripheral(e)
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong in one classification round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// Connection, TLS or I/O failure before a status line arrived.
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// 2xx status with an empty body.
    EmptyBody,
    /// The body was not JSON, or a required nested field was missing.
    Payload(String),
    /// `responses` was present but empty.
    NoResponse,
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::Status(code) => write!(f, "endpoint returned HTTP {code}"),
            Self::EmptyBody => write!(f, "empty response body"),
            Self::Payload(msg) => write!(f, "unexpected payload: {msg}"),
            Self::NoResponse => write!(f, "response list was empty"),
        }
    }
}

impl core::error::Error for ClassificationError {}

impl From<ClassificationError> for Error {
    fn from(e: ClassificationError) -> Self {
        Self::Classification(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingEndpoint,
    MissingApiKey,
    EmptyImageSet,
    /// A field failed range validation; the string names the field.
    ValidationFailed(&'static str),
    /// The config document could not be deserialised.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEndpoint => write!(f, "classification endpoint is not set"),
            Self::MissingApiKey => write!(f, "classification API key is not set"),
            Self::EmptyImageSet => write!(f, "classification image set is empty"),
            Self::ValidationFailed(field) => write!(f, "validation failed: {field}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
