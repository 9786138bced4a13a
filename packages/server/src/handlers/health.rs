use axum::http::StatusCode;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is running", body = String, content_type = "text/plain")),
)]
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "System is Running")
}
