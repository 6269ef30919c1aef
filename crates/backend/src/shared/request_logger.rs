use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_thousands;

/// Middleware: метод, путь, статус, размер ответа и время обработки
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Тело читается целиком, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{}",
                format_line(&method, &path, parts.status, None, start.elapsed())
            );
            tracing::debug!("Failed to read response body: {}", e);
            return Response::from_parts(parts, Body::default());
        }
    };

    let line = format_line(&method, &path, parts.status, Some(bytes.len()), start.elapsed());
    if parts.status.is_success() {
        tracing::info!("{}", line);
    } else {
        tracing::warn!("{}", line);
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn format_line(
    method: &Method,
    path: &str,
    status: StatusCode,
    size: Option<usize>,
    elapsed: Duration,
) -> String {
    let size = match size {
        Some(n) => format_thousands(n as u64, '.'),
        None => "error".to_string(),
    };
    format!(
        "{:>5}ms | {:>12} | {} {:>6} {}",
        elapsed.as_millis(),
        size,
        status.as_u16(),
        method.as_str(),
        path
    )
}
