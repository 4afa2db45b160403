//! JSON wire types for the image-annotation endpoint.
//!
//! Request:
//!
//! ```json
//! {"requests":[{"image":{"source":{"imageUri":"..."}},
//!               "features":[{"type":"WEB_DETECTION","maxResults":2}]}]}
//! ```
//!
//! Only `responses[0].webDetection.webEntities[*].{description,score}` is
//! read back; every other field is ignored.

use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;

use super::Verdict;

pub const WEB_DETECTION: &str = "WEB_DETECTION";

#[derive(Debug, Serialize)]
pub struct AnnotateRequest<'a> {
    pub requests: [ImageRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct ImageRequest<'a> {
    pub image: Image<'a>,
    pub features: [Feature; 1],
}

#[derive(Debug, Serialize)]
pub struct Image<'a> {
    pub source: ImageSource<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource<'a> {
    pub image_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub max_results: u8,
}

#[derive(Debug, Deserialize)]
pub struct AnnotateResponse {
    pub responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    #[serde(default)]
    pub web_detection: Option<WebDetection>,
    #[serde(default)]
    pub error: Option<ServiceStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDetection {
    #[serde(default)]
    pub web_entities: Option<Vec<WebEntity>>,
}

#[derive(Debug, Deserialize)]
pub struct WebEntity {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f32,
}

/// Per-image error the service reports inside a 200 response.
#[derive(Debug, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Serialise the request body for one image.
pub fn request_body(image_uri: &str, max_results: u8) -> Result<Vec<u8>, ClassificationError> {
    let req = AnnotateRequest {
        requests: [ImageRequest {
            image: Image {
                source: ImageSource { image_uri },
            },
            features: [Feature {
                kind: WEB_DETECTION,
                max_results,
            }],
        }],
    };
    serde_json::to_vec(&req).map_err(|e| ClassificationError::Payload(e.to_string()))
}

/// Extract verdicts from a 2xx response body, in response order.
pub fn parse_verdicts(body: &[u8]) -> Result<Vec<Verdict>, ClassificationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ClassificationError::EmptyBody);
    }
    let resp: AnnotateResponse =
        serde_json::from_slice(body).map_err(|e| ClassificationError::Payload(e.to_string()))?;
    let first = resp
        .responses
        .into_iter()
        .next()
        .ok_or(ClassificationError::NoResponse)?;
    if let Some(status) = first.error {
        return Err(ClassificationError::Payload(format!(
            "service error {}: {}",
            status.code, status.message
        )));
    }
    let entities = first
        .web_detection
        .ok_or_else(|| ClassificationError::Payload("missing webDetection".into()))?
        .web_entities
        .ok_or_else(|| ClassificationError::Payload("missing webEntities".into()))?;
    Ok(entities
        .into_iter()
        .map(|e| Verdict {
            label: e.description,
            score: e.score,
        })
        .collect())
}
