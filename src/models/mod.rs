use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Body of `POST /api/recognize`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Client-side name; sanitized before it is used on disk
    #[serde(default)]
    pub filename: String,
    /// Base64-encoded image bytes
    #[serde(default)]
    pub image: String,
}

/// Response of `POST /api/recognize`, for both success and failure.
///
/// Failure bodies only carry `success` and `error`; the empty success
/// fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecognitionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confidence: Vec<f32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub processing_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognitionResult {
    pub fn completed(recognition: Recognition, message: &str, elapsed_secs: f64) -> Self {
        Self {
            success: true,
            objects: recognition.objects,
            confidence: recognition.confidence,
            message: message.to_string(),
            processing_time: format!("{:.2}秒", elapsed_secs),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Labels produced by a [`Recognizer`](crate::services::recognizer::Recognizer).
/// `confidence[i]` belongs to `objects[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub objects: Vec<String>,
    pub confidence: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub start_time: String,
    pub connections_served: String,
}

#[derive(Debug, Clone)]
pub struct SavedImage {
    pub path: PathBuf,
    pub size: u64,
}
