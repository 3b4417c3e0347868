//! # Request/Response Logging Middleware
//!
//! Logs every HTTP exchange with the request id from
//! [`RequestStamp`](super::RequestStamp):
//!
//! - `[REQUEST]` at info with method, path and query; headers at debug with
//!   credentials redacted
//! - `[RESPONSE]` at info for 2xx/3xx, warn for 4xx and error for 5xx, with
//!   the elapsed time

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, info, warn};

use super::RequestStamp;

/// Headers whose values never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key", "x-auth-token"];

fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str();
            if SENSITIVE_HEADERS.contains(&name) {
                Some((name.to_string(), "***REDACTED***".to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}

fn log_response(request_id: &str, method: &str, path: &str, status: StatusCode, elapsed_ms: u128) {
    let code = status.as_u16();

    if status.is_server_error() {
        error!(request_id = %request_id, status = code, duration_ms = elapsed_ms,
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]", method, path, code, elapsed_ms);
    } else if status.is_client_error() {
        warn!(request_id = %request_id, status = code, duration_ms = elapsed_ms,
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]", method, path, code, elapsed_ms);
    } else {
        info!(request_id = %request_id, status = code, duration_ms = elapsed_ms,
            "[RESPONSE] {} {} -> {} ({}ms)", method, path, code, elapsed_ms);
    }
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    info!(
        request_id = %request_id,
        query = ?query,
        "[REQUEST] {} {}",
        method,
        path
    );
    debug!(
        request_id = %request_id,
        headers = ?redacted_headers(req.headers()),
        "[REQUEST HEADERS]"
    );

    let response = next.run(req).await;

    log_response(&request_id, &method, &path, response.status(), start.elapsed().as_millis());
    response
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_redacts_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let logged = redacted_headers(&headers);

        assert!(logged.contains(&("authorization".to_string(), "***REDACTED***".to_string())));
        assert!(logged.contains(&("content-type".to_string(), "application/json".to_string())));
    }
}
// endregion: --- Tests
