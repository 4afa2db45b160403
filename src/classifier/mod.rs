//! Image classification client and verdict evaluation.
//!
//! One round trip per ButtonA press:
//!
//! ```text
//!  ClassificationClient::classify(uri)
//!     │  POST {endpoint}?key={api_key}   (wire::request_body)
//!     ▼
//!  HttpTransport ── status / body ──▶ wire::parse_verdicts ──▶ Vec<Verdict>
//!                                                                  │
//!  ModeController ◀── evaluate(verdicts, rules) ◀──────────────────┘
//! ```
//!
//! `classify()` blocks; the dispatcher runs it on a worker thread and
//! posts the result back onto the event queue.

pub mod wire;

use log::{debug, info};

use crate::app::ports::HttpTransport;
use crate::config::ClassificationConfig;
use crate::error::ClassificationError;
use crate::fsm::ClassificationOutcome;

/// One labelled score from the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub label: String,
    pub score: f32,
}

/// Decides whether a single verdict counts as negative.
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictRules {
    pub negative_labels: Vec<String>,
    /// Strictly-greater-than comparison.
    pub score_threshold: f32,
}

impl VerdictRules {
    pub fn from_config(cfg: &ClassificationConfig) -> Self {
        Self {
            negative_labels: cfg.negative_labels.clone(),
            score_threshold: cfg.score_threshold,
        }
    }

    /// Label contains a negative keyword and the score clears the threshold.
    pub fn is_negative(&self, verdict: &Verdict) -> bool {
        verdict.score > self.score_threshold
            && self
                .negative_labels
                .iter()
                .any(|needle| verdict.label.contains(needle.as_str()))
    }
}

impl Default for VerdictRules {
    fn default() -> Self {
        Self::from_config(&ClassificationConfig::default())
    }
}

/// Fold verdicts in response order; the last one decides.
///
/// No verdicts at all is neutral.
pub fn evaluate(verdicts: &[Verdict], rules: &VerdictRules) -> ClassificationOutcome {
    verdicts
        .last()
        .map_or(ClassificationOutcome::Neutral, |last| {
            if rules.is_negative(last) {
                ClassificationOutcome::Negative
            } else {
                ClassificationOutcome::Neutral
            }
        })
}

/// Blocking client for the annotation endpoint.
pub struct ClassificationClient<T> {
    transport: T,
    url: String,
    endpoint: String,
    max_results: u8,
}

impl<T: HttpTransport> ClassificationClient<T> {
    pub fn new(transport: T, cfg: &ClassificationConfig) -> Self {
        Self {
            transport,
            url: format!("{}?key={}", cfg.endpoint, cfg.api_key),
            endpoint: cfg.endpoint.clone(),
            max_results: cfg.max_results,
        }
    }

    /// Classify one image. Non-2xx statuses and malformed bodies are errors.
    pub fn classify(&self, image_uri: &str) -> Result<Vec<Verdict>, ClassificationError> {
        let body = wire::request_body(image_uri, self.max_results)?;
        // The keyed URL is never logged.
        debug!("classifier: POST {} for {}", self.endpoint, image_uri);
        let resp = self.transport.post_json(&self.url, &body)?;
        if !(200..300).contains(&resp.status) {
            return Err(ClassificationError::Status(resp.status));
        }
        let verdicts = wire::parse_verdicts(&resp.body)?;
        for v in &verdicts {
            info!("classifier: {} ({:.3})", v.label, v.score);
        }
        Ok(verdicts)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
