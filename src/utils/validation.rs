use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;

use crate::models::UploadRequest;

/// Extensions kept verbatim when naming a stored upload
pub const KNOWN_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".gif"];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Accepts any Content-Type mentioning `application/json`, parameters included
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    match content_type {
        Some(ct) if ct.to_lowercase().contains(mime::APPLICATION_JSON.essence_str()) => Ok(()),
        _ => Err(ValidationError {
            code: "INVALID_CONTENT_TYPE",
            message: "Content-Type must be application/json".to_string(),
        }),
    }
}

/// Removes ASCII control characters (0x00-0x1F and 0x7F)
pub fn strip_control_chars(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(*c, '\u{00}'..='\u{1f}' | '\u{7f}'))
        .collect()
}

/// Parses an upload body, retrying once with control characters stripped.
pub fn parse_upload_body(raw: &[u8]) -> Result<UploadRequest, ValidationError> {
    let value = match serde_json::from_slice::<serde_json::Value>(raw) {
        Ok(value) => value,
        Err(first_err) => {
            tracing::error!("JSON parse failed: {}", first_err);
            if raw.is_empty() {
                return Err(empty_body());
            }
            let cleaned = strip_control_chars(&String::from_utf8_lossy(raw));
            match serde_json::from_str::<serde_json::Value>(&cleaned) {
                Ok(value) => {
                    tracing::info!("JSON parsed after stripping control characters");
                    value
                }
                Err(second_err) => {
                    tracing::error!("JSON still invalid after cleanup: {}", second_err);
                    return Err(ValidationError {
                        code: "INVALID_JSON",
                        message: format!("Invalid JSON: {}", first_err),
                    });
                }
            }
        }
    };

    let map = match value {
        serde_json::Value::Object(map) if !map.is_empty() => map,
        _ => return Err(empty_body()),
    };

    // `filename` only names the stored copy, so any JSON value is accepted.
    let filename = match map.get("filename") {
        None | Some(serde_json::Value::Null) => "unknown".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let image = match map.get("image") {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(ValidationError {
                code: "BAD_IMAGE_DATA",
                message: format!(
                    "Invalid image data: expected a base64 string, got {}",
                    json_type_name(other)
                ),
            });
        }
    };

    Ok(UploadRequest { filename, image })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn empty_body() -> ValidationError {
    ValidationError {
        code: "EMPTY_BODY",
        message: "Request body is empty or not valid JSON".to_string(),
    }
}

pub fn validate_image_field(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Err(ValidationError {
            code: "EMPTY_IMAGE",
            message: "image field must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Undoes transport damage to base64: form-decoded `+` arrives as a space,
/// and some encoders wrap lines or pad with tabs.
pub fn normalize_base64(data: &str) -> String {
    data.chars()
        .filter(|c| *c == ' ' || !c.is_ascii_whitespace())
        .map(|c| if c == ' ' { '+' } else { c })
        .collect()
}

/// Base64-decodes and then image-decodes the `image` field.
pub fn decode_image_data(data: &str) -> Result<DynamicImage, ValidationError> {
    let bad_image = |detail: String| ValidationError {
        code: "BAD_IMAGE_DATA",
        message: format!("Invalid image data: {}", detail),
    };

    let bytes = STANDARD
        .decode(normalize_base64(data))
        .map_err(|e| bad_image(e.to_string()))?;

    image::load_from_memory(&bytes).map_err(|e| bad_image(e.to_string()))
}

/// Keeps only alphanumerics and `-`, `_`, `.`; falls back to "unknown".
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(*c, '-' | '_' | '.'))
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}

/// Returns the known image extension `filename` ends with (case-insensitive),
/// as written in `filename`.
pub fn known_image_extension(filename: &str) -> Option<&str> {
    let lower = filename.to_lowercase();
    if !KNOWN_IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return None;
    }
    filename.rfind('.').map(|idx| &filename[idx..])
}
