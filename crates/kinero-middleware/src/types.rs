//! Common types used throughout the middleware pipeline.
//!
//! This module defines the HTTP request and response types used by middleware
//! and the result type every stage returns.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use kinero_core::{CanonicalError, KineroError};
use serde::Serialize;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// What a stage or handler produces.
///
/// Failures travel up the chain as `Err` values until the error
/// normalization stage turns them into a canonical error response.
pub type MiddlewareResult = Result<Response, KineroError>;

/// Extension trait for building JSON responses.
pub trait ResponseExt {
    /// Creates a JSON response with the given status code.
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Response;

    /// Creates the response for a canonical error body.
    fn canonical_error(error: &CanonicalError) -> Response;
}

impl ResponseExt for Response {
    fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
        match serde_json::to_vec(body) {
            Ok(bytes) => http::Response::builder()
                .status(status)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(bytes)))
                .expect("valid JSON response"),
            Err(e) => http::Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(Full::new(Bytes::from(format!("failed to encode body: {e}"))))
                .expect("valid error response"),
        }
    }

    fn canonical_error(error: &CanonicalError) -> Response {
        let status =
            StatusCode::from_u16(error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(error.to_json())))
            .expect("valid error response")
    }
}
