//! Helper types and traits for cleaner route handlers.

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

/// Standard result type for route handlers returning HTML.
pub type RouteResult<T> = Result<T, (StatusCode, String)>;

/// Extension trait for converting `Option<T>` to `RouteResult<T>`.
pub trait OptionExt<T> {
    /// Returns the contained value or a 404 Not Found error.
    fn or_not_found(self, msg: &str) -> RouteResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> RouteResult<T> {
        self.ok_or_else(|| (StatusCode::NOT_FOUND, msg.to_string()))
    }
}

/// Extension trait for converting `Result<T, E>` to `RouteResult<T>`.
pub trait ResultExt<T, E: std::fmt::Display> {
    /// Converts the error to 500 Internal Server Error.
    fn or_internal_error(self) -> RouteResult<T>;

    /// Converts the error to 400 Bad Request.
    fn or_bad_request(self) -> RouteResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }

    fn or_bad_request(self) -> RouteResult<T> {
        self.map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

/// POST-Redirect-GET response.
///
/// HTMX requests get `HX-Redirect` (a full page navigation); plain form
/// submissions get 303 See Other.
pub fn redirect_after_post(headers: &HeaderMap, url: &str) -> RouteResult<Response> {
    if headers.get("HX-Request").is_some() {
        Response::builder()
            .status(StatusCode::OK)
            .header("HX-Redirect", url)
            .body(Body::empty())
            .or_internal_error()
    } else {
        Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header(header::LOCATION, url)
            .body(Body::empty())
            .or_internal_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_redirect_plain_form() {
        let response = redirect_after_post(&HeaderMap::new(), "/session/x").unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/session/x");
    }

    #[test]
    fn test_redirect_htmx() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        let response = redirect_after_post(&headers, "/session/x").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/session/x");
    }

    #[test]
    fn test_option_not_found() {
        let err = None::<u8>.or_not_found("Session not found").unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
