use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_number;

/// Logs one line per request: status, method, path, duration and body size.
///
/// Server errors are logged at `warn`, everything else at `info`.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Buffer the body to learn its real size
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} {} | {}ms | body error: {}",
                parts.status.as_u16(),
                method,
                uri.path(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let duration = start.elapsed();
    if parts.status.is_server_error() {
        tracing::warn!(
            "{} {} {} | {}ms | {} bytes",
            parts.status.as_u16(),
            method,
            uri.path(),
            duration.as_millis(),
            format_number(bytes.len())
        );
    } else {
        tracing::info!(
            "{} {} {} | {}ms | {} bytes",
            parts.status.as_u16(),
            method,
            uri.path(),
            duration.as_millis(),
            format_number(bytes.len())
        );
    }

    Response::from_parts(parts, Body::from(bytes))
}
