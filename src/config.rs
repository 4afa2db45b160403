//! Controller configuration parameters.
//!
//! All tunable parameters for the door-mode controller. The endpoint and
//! API key have no usable default and must be injected before
//! [`ControllerConfig::validate`] passes.

use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigError};

/// Core controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub classification: ClassificationConfig,
    pub strip: StripConfig,
    pub tone: ToneConfig,
}

/// Image-classification endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Annotate endpoint; the API key is appended as `?key=`.
    pub endpoint: String,
    pub api_key: String,
    /// `maxResults` sent with the WEB_DETECTION feature.
    pub max_results: u8,
    /// A verdict whose label contains any of these is "negative".
    pub negative_labels: Vec<String>,
    /// Negative verdicts only count when the score is strictly above this.
    pub score_threshold: f32,
    /// Fixed image set; ButtonA picks one pseudo-randomly.
    pub images: Vec<String>,
    pub timeout_secs: u32,
}

/// Addressable strip settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// APA102 global brightness used whenever the strip is lit (1–31).
    pub brightness: u8,
}

/// Tone slide timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Delay before every sweep starts (speaker settling).
    pub settle_delay_ms: u32,
    /// Sweep end frequency.
    pub ceiling_hz: f32,
    /// Duration of one pass from start to ceiling.
    pub sweep_ms: u32,
    /// Extra passes after the first.
    pub repeats: u8,
    /// Discrete frequency steps per pass.
    pub steps_per_sweep: u8,
    /// Suppress all tone output.
    pub muted: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://vision.googleapis.com/v1/images:annotate"),
            api_key: String::new(),
            max_results: 2,
            negative_labels: vec![String::from("Anger")],
            score_threshold: 0.5,
            images: vec![
                String::from("https://example.com/doormode/visitor-1.jpg"),
                String::from("https://example.com/doormode/visitor-2.jpg"),
                String::from("https://example.com/doormode/visitor-3.jpg"),
            ],
            timeout_secs: 30,
        }
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self { brightness: 1 }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 300,
            ceiling_hz: 440.0 * 4.0,
            sweep_ms: 50,
            repeats: 5,
            steps_per_sweep: 10,
            muted: false,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            classification: ClassificationConfig::default(),
            strip: StripConfig::default(),
            tone: ToneConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON config document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the config is usable. Any error here is fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.classification;
        if c.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if c.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if c.images.is_empty() {
            return Err(ConfigError::EmptyImageSet);
        }
        if c.max_results == 0 {
            return Err(ConfigError::ValidationFailed("classification.max_results"));
        }
        if !(0.0..=1.0).contains(&c.score_threshold) {
            return Err(ConfigError::ValidationFailed("classification.score_threshold"));
        }
        if self.strip.brightness == 0 || self.strip.brightness > 31 {
            return Err(ConfigError::ValidationFailed("strip.brightness"));
        }
        if self.tone.steps_per_sweep < 2 {
            return Err(ConfigError::ValidationFailed("tone.steps_per_sweep"));
        }
        if self.tone.sweep_ms == 0 {
            return Err(ConfigError::ValidationFailed("tone.sweep_ms"));
        }
        if self.tone.ceiling_hz.is_nan() || self.tone.ceiling_hz <= 0.0 {
            return Err(ConfigError::ValidationFailed("tone.ceiling_hz"));
        }
        Ok(())
    }

    /// Startup path: optional JSON overrides, then the injected API key,
    /// then validation. An empty `api_key` keeps whatever the document set.
    pub fn load(json: Option<&str>, api_key: &str) -> error::Result<Self> {
        let mut config = match json {
            Some(text) => Self::from_json(text)?,
            None => Self::default(),
        };
        if !api_key.is_empty() {
            config = config.with_api_key(api_key);
        }
        config.validate()?;
        Ok(config)
    }

    /// Builder-style API key injection.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.classification.api_key = key.into();
        self
    }
}
