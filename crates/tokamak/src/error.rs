/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! The error funnel: every failure mode that can occur while dispatching a request collapses
//! into a single [`DispatchError`], which knows how to render itself as a [`Response`].

use std::sync::Arc;

use crate::response::{IntoResponse, Response};
use http::StatusCode;
use tokamak_inject::{ConstructionError, InjectionError};

/// A user-installed override of the default error-to-response mapping (§7 "The user may
/// install a handler named `errorHandler(ctx, err)`"). Returns `None` to fall through to the
/// next bundle's handler, or ultimately [`DispatchError::into_response`].
pub type ErrorHandlerFn = Arc<dyn Fn(&DispatchError) -> Option<Response> + Send + Sync>;

/// Everything that can go wrong resolving and invoking a handler for a single request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// No route matched the request's method and path.
    #[error("no route matches {method} {path}")]
    RouteNotMatched {
        /// The request method.
        method: String,
        /// The request path.
        path: String,
    },
    /// A path parameter couldn't be parsed into the type the handler asked for.
    #[error("bad path parameter {name:?}: {source}")]
    BadPathParam {
        /// The parameter name, as declared in the route pattern.
        name: &'static str,
        /// The underlying parse error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The request body couldn't be decoded into the type the handler asked for.
    #[error("bad request body: {0}")]
    BadBody(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The request body exceeded the configured size limit.
    #[error("request body too large")]
    BodyTooLarge,
    /// A handler declared an [`crate::extract::Extension<T>`] parameter but no middleware
    /// further up the chain had pushed a value of that type via [`crate::context::Context::provide`].
    #[error("no value of type {0} was provided for this request")]
    MissingExtension(&'static str),
    /// Dependency resolution failed while building a handler's arguments (missing
    /// registration or a dependency cycle).
    #[error(transparent)]
    Injection(#[from] InjectionError),
    /// A handler-level semantic error, carrying the status code it should render as.
    #[error("{message}")]
    Handler {
        /// The status code to answer with.
        status: StatusCode,
        /// A human-readable message, suitable for a JSON error body.
        message: String,
    },
    /// A handler panicked or returned an unexpected internal error.
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Transport-level failure (reading the body, writing the response) below the
    /// application layer.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// The status code this error should render as.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotMatched { .. } => StatusCode::NOT_FOUND,
            Self::BadPathParam { .. } | Self::BadBody(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Injection(_) | Self::Internal(_) | Self::Transport(_) | Self::MissingExtension(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Handler { status, .. } => *status,
        }
    }

    /// Builds a handler-level semantic error with an explicit status code, e.g. for
    /// authorization failures (`401`/`403`) or conflicts (`409`).
    #[must_use]
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for [`DispatchError::handler`] with `404 Not Found`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Shorthand for [`DispatchError::handler`] with `401 Unauthorized`.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// Shorthand for [`DispatchError::handler`] with `403 Forbidden`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    /// Shorthand for [`DispatchError::handler`] with `409 Conflict`.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::CONFLICT, message)
    }

    /// The stable variant name this error renders as in its JSON body's `"error"` field (§7,
    /// §8 scenario 6: `DispatchError::not_found(...)` must render `{"error":"NotFound"}`, not
    /// the human-readable message passed to it).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RouteNotMatched { .. } => "RouteNotMatched",
            Self::BadPathParam { .. } => "BadPathParam",
            Self::BadBody(_) | Self::BodyTooLarge => "BadBody",
            Self::MissingExtension(_) => "MissingExtension",
            Self::Injection(err) => injection_error_kind(err),
            Self::Handler { status, .. } => handler_error_kind(*status),
            Self::Internal(_) => "Internal",
            Self::Transport(_) => "Transport",
        }
    }
}

/// Maps a handler-level [`DispatchError::Handler`] status code back to the stable name its
/// constructor (`not_found`, `unauthorized`, ...) is named after; an unrecognized status built
/// via [`DispatchError::handler`] directly falls back to a generic name.
fn handler_error_kind(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BadRequest",
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::CONFLICT => "Conflict",
        _ => "HandlerError",
    }
}

/// Maps a `tokamak_inject` [`InjectionError`] to the stable name of its own variant. Matched
/// with a catch-all since [`InjectionError`] is `#[non_exhaustive]`.
fn injection_error_kind(err: &InjectionError) -> &'static str {
    match err {
        InjectionError::UninitializedServiceProvider { .. } => "UninitializedServiceProvider",
        InjectionError::DroppedServiceProvider { .. } => "DroppedServiceProvider",
        InjectionError::CyclicReference { .. } => "CyclicReference",
        InjectionError::ServiceNotFound { .. } => "ServiceNotFound",
        InjectionError::Custom { .. } => "Custom",
        _ => "Injection",
    }
}

impl From<DispatchError> for ConstructionError {
    fn from(err: DispatchError) -> Self {
        Self::Custom(Box::new(err))
    }
}

impl From<ConstructionError> for DispatchError {
    fn from(err: ConstructionError) -> Self {
        match err {
            ConstructionError::InjectionError(err) => Self::Injection(err),
            ConstructionError::Custom(boxed) => match boxed.downcast::<DispatchError>() {
                Ok(dispatch_err) => *dispatch_err,
                Err(other) => Self::Internal(other),
            },
        }
    }
}

impl IntoResponse for ConstructionError {
    fn into_response(self) -> Response {
        DispatchError::from(self).into_response()
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        #[derive(serde::Serialize)]
        struct ErrorBody {
            error: &'static str,
        }

        Response::json(status, &ErrorBody { error: self.kind() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_field(response: Response) -> String {
        let (_, _, body) = response.into_parts();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        value["error"].as_str().unwrap().to_owned()
    }

    #[test]
    fn not_found_renders_its_stable_kind_not_the_message() {
        let response = DispatchError::not_found("user missing").into_response();
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error_field(response), "NotFound");
    }

    #[test]
    fn route_not_matched_renders_its_variant_name() {
        let response = DispatchError::RouteNotMatched {
            method: "GET".to_owned(),
            path: "/x".to_owned(),
        }
        .into_response();
        assert_eq!(error_field(response), "RouteNotMatched");
    }

    #[test]
    fn unauthorized_and_conflict_render_their_stable_kinds() {
        assert_eq!(
            error_field(DispatchError::unauthorized("no token").into_response()),
            "Unauthorized"
        );
        assert_eq!(
            error_field(DispatchError::conflict("already exists").into_response()),
            "Conflict"
        );
    }
}
