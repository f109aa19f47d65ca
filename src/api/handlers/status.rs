use axum::Json;

use crate::models::StatusResponse;

// Placeholders: uptime and request counters are not tracked.
const START_TIME: &str = "2024-01-15 10:30:25";
const CONNECTIONS_SERVED: &str = "统计信息...";

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Server status", body = StatusResponse)
    ),
    tag = "system"
)]
pub async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        start_time: START_TIME.to_string(),
        connections_served: CONNECTIONS_SERVED.to_string(),
    })
}
