pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::ServerConfig;
use crate::services::image_store::ImageStore;
use crate::services::recognizer::{Recognizer, StubRecognizer};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::recognize::recognize_image,
        api::handlers::status::get_status,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadRequest,
            models::RecognitionResult,
            models::StatusResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "recognition", description = "Image upload and recognition"),
        (name = "system", description = "Status endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub images: Arc<ImageStore>,
    pub recognizer: Arc<dyn Recognizer>,
}

impl AppState {
    /// State backed by the stub recognizer
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            images: Arc::new(ImageStore::new(config.upload_dir.clone())),
            recognizer: Arc::new(StubRecognizer),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/status", get(api::handlers::status::get_status))
        .route(
            "/api/recognize",
            post(api::handlers::recognize::recognize_image),
        )
        .with_state(state)
}
