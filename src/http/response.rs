//! Response helpers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Terminal response when every link in the dispatch chain has declined.
///
/// Chain exhaustion is a normal outcome, not an error.
pub fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

/// Request-scoped failure. The process and other in-flight requests are
/// unaffected; only this request sees the error.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_404() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_response_carries_status() {
        let response = error_response(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
