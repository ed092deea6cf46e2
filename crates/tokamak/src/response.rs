/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! The outgoing half of a request/response pair.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};

/// An HTTP response being built by a handler or middleware.
///
/// Transport (axum/hyper) details are deliberately absent here: a [`Response`] is a plain
/// status/headers/body triple, converted to an `axum::response::Response` only at the very
/// edge, in the dispatcher.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// An empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builds a response with the given status and raw body bytes.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::new()
        }
    }

    /// A plain-text response.
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut response = Self::with_status(status).body(Bytes::from(body.into()));
        response.set_header(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref());
        response
    }

    /// A `application/json` response, serializing `value`. Serialization failures render as
    /// `500 Internal Server Error` rather than panicking - a handler's return type should be
    /// infallibly serializable, but middleware and error renderers must not panic regardless.
    #[must_use]
    pub fn json<T: serde::Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                let mut response = Self::with_status(status).body(Bytes::from(bytes));
                response.set_header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
                response
            }
            Err(err) => {
                tracing::error!(%err, "failed to serialize response body");
                Self::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to serialize response body",
                )
            }
        }
    }

    /// Replaces the body, consuming `self`.
    #[must_use]
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Sets the status code, consuming `self`.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets a header, consuming `self`. Invalid header values are silently dropped rather
    /// than propagated, matching how most handler-facing response builders behave.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: impl AsRef<str>) -> Self {
        self.set_header(name, value.as_ref());
        self
    }

    fn set_header(&mut self, name: HeaderName, value: &str) {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
    }

    /// The status code this response currently carries.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// The headers set on this response so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decomposes the response into its status, headers and body, e.g. for a transport
    /// adapter to render or a test to inspect.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversion of a handler's return value into a [`Response`], mirroring
/// `axum::response::IntoResponse`.
pub trait IntoResponse {
    /// Renders `self` as a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        Response::new()
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::with_status(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(StatusCode::OK, self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(StatusCode::OK, self)
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(value) => value.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type() {
        let response = Response::json(StatusCode::CREATED, &serde_json::json!({"ok": true}));
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            mime::APPLICATION_JSON.as_ref()
        );
    }

    #[test]
    fn result_delegates_to_inner_variant() {
        let ok: Result<&'static str, StatusCode> = Ok("hi");
        assert_eq!(ok.into_response().status_code(), StatusCode::OK);

        let err: Result<&'static str, StatusCode> = Err(StatusCode::IM_A_TEAPOT);
        assert_eq!(err.into_response().status_code(), StatusCode::IM_A_TEAPOT);
    }
}
