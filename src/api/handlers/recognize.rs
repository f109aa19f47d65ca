use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::BytesRejection},
    http::{HeaderMap, header},
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{error, info};

use crate::AppState;
use crate::api::error::AppError;
use crate::models::{RecognitionResult, UploadRequest};
use crate::utils::validation::{
    decode_image_data, parse_upload_body, validate_content_type, validate_image_field,
};

pub const COMPLETED_MESSAGE: &str = "识别完成";

/// Characters of the raw body echoed into the log
const RAW_PREVIEW_CHARS: usize = 200;

#[utoipa::path(
    post,
    path = "/api/recognize",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Image decoded, saved and recognized", body = RecognitionResult),
        (status = 400, description = "Wrong content type, invalid JSON, empty or undecodable image", body = RecognitionResult),
        (status = 413, description = "Body exceeds the configured limit", body = RecognitionResult),
        (status = 500, description = "Recognition failed", body = RecognitionResult)
    ),
    tag = "recognition"
)]
pub async fn recognize_image(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RecognitionResult>, AppError> {
    let started = Instant::now();
    let client_ip = addr.ip().to_string();

    let body = body.inspect_err(|e| {
        error!("Failed to read body from {}: {}", client_ip, e.body_text());
    })?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    validate_content_type(content_type)?;

    if !body.is_empty() {
        let preview: String = String::from_utf8_lossy(&body)
            .chars()
            .take(RAW_PREVIEW_CHARS)
            .collect();
        info!("Raw body (first {} chars): {}", RAW_PREVIEW_CHARS, preview);
    }

    let request = parse_upload_body(&body)?;
    validate_image_field(&request.image)?;

    info!(
        "Recognition started - client: {} | filename: {} | data length: {}",
        client_ip,
        request.filename,
        request.image.len()
    );

    let image = decode_image_data(&request.image).inspect_err(|e| {
        error!("Image decode failed: {}", e.message);
    })?;

    info!("Saving image from {} as {}", client_ip, request.filename);
    state
        .images
        .save(&image, &request.filename, &client_ip)
        .await;

    info!(
        "Image info - size: {}x{} | client: {}",
        image.width(),
        image.height(),
        client_ip
    );

    let recognition = match state.recognizer.recognize(&image).await {
        Ok(recognition) => recognition,
        Err(e) => {
            error!(
                "Recognition failed - client: {} | error: {} | elapsed: {:.2}s",
                client_ip,
                e,
                started.elapsed().as_secs_f64()
            );
            return Err(AppError::Internal(e.to_string()));
        }
    };

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "Recognition completed - client: {} | elapsed: {:.2}s | objects: {:?}",
        client_ip, elapsed, recognition.objects
    );

    Ok(Json(RecognitionResult::completed(
        recognition,
        COMPLETED_MESSAGE,
        elapsed,
    )))
}
