use axum::http::StatusCode;

/// Liveness probe
///
/// Returns 200 while the server is up, whether or not the SMAAWA API is
/// reachable. Not rate-limited.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Server is running"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
