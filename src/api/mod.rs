//! Client for the remote cataract classification service
//!
//! One call per analysis: the image is posted as a single multipart field
//! and the JSON verdict is mapped to a `DetectionResult`.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::state::data::{DetectionResult, EncodedImage, ImageDataError};

mod types;

pub use types::{ErrorResponse, PredictResponse};

/// Multipart field the service reads the image from
const FILE_FIELD: &str = "file";
/// Filename sent with the upload; the service only looks at the content type
const UPLOAD_FILENAME: &str = "image.jpg";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid image payload: {0}")]
    Payload(#[from] ImageDataError),
    #[error("image has an invalid media type: {0}")]
    MediaType(String),
    #[error("could not reach the analysis service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis service returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("malformed response from the analysis service: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("analysis service reported a non-finite confidence")]
    InvalidConfidence,
}

/// HTTP client bound to one inference service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    predict_url: String,
    health_url: String,
}

impl AnalysisClient {
    pub fn new(settings: &Settings) -> Result<Self, AnalysisError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            predict_url: settings.predict_url(),
            health_url: settings.health_url(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Send `image` to the service and map its verdict
    pub async fn analyze(&self, image: &EncodedImage) -> Result<DetectionResult, AnalysisError> {
        let form = build_form(image)?;

        debug!("POST {}", self.predict_url);
        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status,
                detail: error_detail(status, &body),
            });
        }

        let prediction: PredictResponse = serde_json::from_str(&body)?;
        debug!(
            "Service verdict: {:?} probabilities={:?}",
            prediction.prediction, prediction.probabilities
        );

        to_detection_result(prediction)
    }

    /// Whether the service answers on its root route
    pub async fn check_health(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("⚠️  Analysis service unreachable at {}: {}", self.health_url, e);
                false
            }
        }
    }
}

/// Decode the data URI and wrap it as the single `file` part
fn build_form(image: &EncodedImage) -> Result<Form, AnalysisError> {
    let bytes = image.decode()?;
    let media_type = image.media_type();
    let part = Part::bytes(bytes)
        .file_name(UPLOAD_FILENAME)
        .mime_str(media_type)
        .map_err(|_| AnalysisError::MediaType(media_type.to_string()))?;

    Ok(Form::new().part(FILE_FIELD, part))
}

/// Prefer the service's own `detail` message, fall back to the status reason
fn error_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

/// Map the wire response to a result stamped with the current time
fn to_detection_result(response: PredictResponse) -> Result<DetectionResult, AnalysisError> {
    if !response.confidence.is_finite() {
        return Err(AnalysisError::InvalidConfidence);
    }

    let mut confidence = response.confidence;
    if !(0.0..=100.0).contains(&confidence) {
        warn!("⚠️  Confidence {} outside 0-100, clamping", confidence);
        confidence = confidence.clamp(0.0, 100.0);
    }

    Ok(DetectionResult::new(response.has_cataract, confidence))
}
