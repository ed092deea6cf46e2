/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Ties a [`Router`] and a [`ServiceProvider`] together: given a buffered [`Request`], builds
//! the per-request [`Context`], runs the middleware chain down to the matched handler, and
//! funnels every failure mode through [`DispatchError`].

use std::sync::Arc;

use bumpalo::Bump;
use tokamak_inject::{Refs, ServiceProvider};

use crate::context::{Context, MiddlewareFn};
use crate::error::{DispatchError, ErrorHandlerFn};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::routing::Router;

/// Binds a built [`Router`] to a built [`ServiceProvider`], ready to dispatch requests.
///
/// Global middleware - registered by [`crate::bundle::Bundle::configure_middleware`] across
/// every participating bundle - runs ahead of the route-specific handler on every request,
/// in the order bundles were composed into the [`crate::app::Application`].
pub struct Dispatcher {
    router: Router,
    provider: ServiceProvider,
    middleware: Vec<MiddlewareFn>,
    error_handler: Option<ErrorHandlerFn>,
}

impl Dispatcher {
    /// Builds a dispatcher from a compiled router, a built service provider, the global
    /// middleware chain (outermost first), and an optional composed
    /// [`crate::bundle::Bundle::error_handler`] override.
    #[must_use]
    pub fn new(
        router: Router,
        provider: ServiceProvider,
        middleware: Vec<MiddlewareFn>,
        error_handler: Option<ErrorHandlerFn>,
    ) -> Self {
        Self {
            router,
            provider,
            middleware,
            error_handler,
        }
    }

    /// Matches `request` against the route tree and runs it through the middleware chain,
    /// returning a [`Response`] in every case - dispatch itself never fails; failures become
    /// error responses via [`Dispatcher::render_error`].
    pub fn dispatch(&self, request: Request) -> Response {
        let method = request.method();
        let path = request.path().to_owned();

        let Some((route, params)) = self.router.find(method, &path) else {
            return self.render_error(DispatchError::RouteNotMatched {
                method: method.to_string(),
                path,
            });
        };

        let route = route.clone();

        if let Some(limit) = route.max_body_len_override() {
            if request.body().len() > limit {
                return self.render_error(DispatchError::BodyTooLarge);
            }
        }

        let arena = Bump::new();
        let path_params = crate::context::PathParams::new(params);

        let mut chain = self.middleware.clone();
        chain.extend(route.middleware().iter().cloned());
        chain.push(Arc::new(move |ctx: &Context<'_>| Ok(route.invoke(ctx))));

        let result = self.provider.resolve_scoped(Refs::new(), |scope| {
            let ctx = Context::new(&arena, &request, path_params, &chain, scope);
            ctx.next()
        });

        match result {
            Ok(Ok(response)) => response,
            Ok(Err(construction_err)) => self.render_error(construction_err.into()),
            Err(injection_err) => self.render_error(DispatchError::Injection(injection_err)),
        }
    }

    /// Renders `err` as a response, giving a user-installed
    /// [`crate::bundle::Bundle::error_handler`] first refusal before falling back to
    /// [`DispatchError::into_response`]'s default JSON mapping.
    fn render_error(&self, err: DispatchError) -> Response {
        if let Some(handler) = &self.error_handler {
            if let Some(response) = handler(&err) {
                return response;
            }
        }

        err.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::routing::{RouteDef, Router};
    use tokamak_inject::ServiceCollection;

    fn echo_len(request: &Request) -> String {
        request.body().len().to_string()
    }

    fn build(router: Router) -> Dispatcher {
        let provider = ServiceCollection::new().build();
        Dispatcher::new(router, provider, Vec::new(), None)
    }

    #[test]
    fn unmatched_route_renders_404() {
        let dispatcher = build(Router::new());
        let request = Request::new(
            Method::Get,
            "/nope".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        let response = dispatcher.dispatch(request);
        assert_eq!(response.status_code(), http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn per_route_body_limit_rejects_oversized_requests() {
        let router = Router::new()
            .route(RouteDef::new("POST", "/upload", echo_len).max_body_len(4))
            .unwrap();
        let dispatcher = build(router);

        let request = Request::new(
            Method::Post,
            "/upload".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::from_static(b"way too much"),
        );

        let response = dispatcher.dispatch(request);
        assert_eq!(response.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn per_route_body_limit_allows_requests_within_bounds() {
        let router = Router::new()
            .route(RouteDef::new("POST", "/upload", echo_len).max_body_len(4))
            .unwrap();
        let dispatcher = build(router);

        let request = Request::new(
            Method::Post,
            "/upload".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::from_static(b"ok"),
        );

        let response = dispatcher.dispatch(request);
        assert_eq!(response.status_code(), http::StatusCode::OK);
    }
}
