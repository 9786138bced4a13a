use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

/// Log method, path, status and latency of every request.
///
/// Client errors log at `warn` and server errors at `error`, so failed
/// requests stand out without raising the log level.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if response.status().is_server_error() {
        error!(%method, %path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, status, elapsed_ms, "Request rejected");
    } else {
        info!(%method, %path, status, elapsed_ms, "Request handled");
    }

    response
}
