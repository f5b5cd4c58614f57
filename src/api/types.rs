//! Wire types of the inference service

use std::collections::HashMap;

use serde::Deserialize;

/// Body of a successful `POST /predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub has_cataract: bool,
    /// Confidence of the predicted class, 0-100
    pub confidence: f64,
    /// Predicted class name ("Cataract" / "Normal")
    #[serde(default)]
    pub prediction: Option<String>,
    /// Per-class probabilities, 0-1
    #[serde(default)]
    pub probabilities: Option<HashMap<String, f64>>,
}

/// Error body the service sends with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
