//! Shared data structures for the application state
//!
//! These types represent the data model that flows between
//! the image sources, the analysis client, and the UI layer.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Confidence above which a detection is reported as severe
const SEVERE_THRESHOLD: f64 = 90.0;
/// Confidence above which a detection is reported as moderate
const MODERATE_THRESHOLD: f64 = 75.0;

/// Errors raised while decoding a data URI back into bytes
#[derive(Debug, Error, PartialEq)]
pub enum ImageDataError {
    #[error("not a data URI")]
    MissingScheme,
    #[error("data URI has no payload separator")]
    MissingPayload,
    #[error("only base64 data URIs are supported")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// One still photo, held as a self-describing `data:` URI.
///
/// Cloning is cheap: the URI is shared.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    uri: Arc<str>,
}

impl EncodedImage {
    /// Encode raw image bytes with their MIME type
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        let uri = format!("data:{};base64,{}", media_type, STANDARD.encode(bytes));
        Self { uri: uri.into() }
    }

    /// Wrap an existing data URI after checking that it decodes
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageDataError> {
        let image = Self { uri: uri.into() };
        image.decode()?;
        Ok(image)
    }

    /// The full `data:` URI
    pub fn as_data_uri(&self) -> &str {
        &self.uri
    }

    /// MIME type declared in the URI header (e.g. "image/jpeg")
    ///
    /// Falls back to `application/octet-stream` when the header is empty.
    pub fn media_type(&self) -> &str {
        let header = self
            .uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .map(|(header, _)| header)
            .unwrap_or_default();

        match header.split(';').next() {
            Some(mime) if !mime.is_empty() => mime,
            _ => "application/octet-stream",
        }
    }

    /// Decode the payload back to binary
    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        let rest = self
            .uri
            .strip_prefix("data:")
            .ok_or(ImageDataError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageDataError::MissingPayload)?;

        if !header.split(';').any(|param| param == "base64") {
            return Err(ImageDataError::NotBase64);
        }

        STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageDataError::Base64(e.to_string()))
    }
}

// The payload can be megabytes long, keep it out of logs
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("media_type", &self.media_type())
            .field("uri_len", &self.uri.len())
            .finish()
    }
}

/// Severity label derived from the model confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Map a 0-100 confidence to a severity bucket
    ///
    /// Thresholds are exclusive: exactly 90 is moderate, exactly 75 is mild.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > SEVERE_THRESHOLD {
            Severity::Severe
        } else if confidence > MODERATE_THRESHOLD {
            Severity::Moderate
        } else {
            Severity::Mild
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

/// The structured outcome of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Whether the service classified the eye as having a cataract
    pub has_cataract: bool,
    /// Model confidence on a 0-100 scale, at the precision the service sent
    pub confidence: f64,
    /// Derived from `confidence`, computed even when `has_cataract` is false
    pub severity: Severity,
    /// Local clock at the moment the response was processed
    pub analyzed_at: DateTime<Utc>,
}

impl DetectionResult {
    /// Build a result from the service's verdict, stamped with the current time
    pub fn new(has_cataract: bool, confidence: f64) -> Self {
        Self::at(has_cataract, confidence, Utc::now())
    }

    /// Build a result with an explicit analysis timestamp
    pub fn at(has_cataract: bool, confidence: f64, analyzed_at: DateTime<Utc>) -> Self {
        Self {
            has_cataract,
            confidence,
            severity: Severity::from_confidence(confidence),
            analyzed_at,
        }
    }
}
