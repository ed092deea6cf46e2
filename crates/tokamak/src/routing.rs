/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! The route tree: a flat list of [`RouteDef`]s, matched in registration order, each bound
//! to a type-erased handler invoked through [`Context::FromContext`]/[`Handler`]
//! introspection rather than a fixed positional signature.

use std::borrow::Cow;
use std::sync::Arc;

use http::header;
use tokamak_inject::ConstructionResult;

use crate::context::{Context, FromContext, Handler, MiddlewareFn};
use crate::method::Method;
use crate::path::{PathPattern, RouteBuildError};
use crate::response::{IntoResponse, Response};

type BoxedHandler = Arc<dyn for<'r> Fn(&'r Context<'r>) -> Response + Send + Sync>;

/// A single method+path route, with its handler already bound and type-erased.
///
/// Built via [`RouteDef::new`] (or, more conveniently, one of the verb functions - [`get`],
/// [`post`], [`put`], ... - in this module) - in practice almost always by the
/// `#[route("METHOD /path")]` attribute macro expanding an `impl` block's methods into a
/// [`Routed::route_defs`].
#[derive(Clone)]
pub struct RouteDef {
    method: Method,
    path: Cow<'static, str>,
    handler: BoxedHandler,
    middleware: Vec<MiddlewareFn>,
    max_body_len: Option<usize>,
}

impl RouteDef {
    /// Builds a route from an HTTP method name (e.g. `"GET"`), a path pattern (e.g.
    /// `"/users/:id"`), and a handler whose parameters each implement
    /// [`crate::context::FromContext`].
    ///
    /// # Panics
    /// Panics if `method` is not a recognized HTTP method name. This is only ever called
    /// from macro-generated code where the method name was already validated at compile
    /// time by `#[route(...)]`, so a panic here means the macro's own validation regressed.
    #[must_use]
    pub fn new<F, Args>(method: &str, path: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Handler<Args> + Copy + Send + Sync + 'static,
        Args: for<'r> FromContext<'r> + 'static,
        F::Output: IntoResponse,
    {
        let method = Method::parse(method)
            .unwrap_or_else(|| panic!("unknown HTTP method {method:?} in route definition"));

        let handler: BoxedHandler = Arc::new(move |ctx: &Context<'_>| {
            match Args::from_context(ctx) {
                Ok(args) => {
                    let output = handler.call(args);
                    if ctx.has_responded() {
                        ctx.take_response()
                    } else {
                        output.into_response()
                    }
                }
                Err(err) => err.into_response(),
            }
        });

        Self {
            method,
            path: path.into(),
            handler,
            middleware: Vec::new(),
            max_body_len: None,
        }
    }

    /// Builds a route whose handler ignores the request entirely and always answers with
    /// `response` (or, if an earlier middleware already responded, that response instead -
    /// the same "discard on already-responded" rule terminal handlers follow). Backs [`send`]
    /// and [`redirect`].
    fn constant(method: Method, path: impl Into<Cow<'static, str>>, response: Response) -> Self {
        let handler: BoxedHandler = Arc::new(move |ctx: &Context<'_>| {
            if ctx.has_responded() {
                ctx.take_response()
            } else {
                response.clone()
            }
        });

        Self {
            method,
            path: path.into(),
            handler,
            middleware: Vec::new(),
            max_body_len: None,
        }
    }

    /// Overrides the application-wide [`crate::config::AppConfig::max_body_bytes`] limit for
    /// this route alone (§6 "Per-route: `max_body_len`"), e.g. to allow a larger upload
    /// endpoint without raising the default for every other route.
    #[must_use]
    pub fn max_body_len(mut self, bytes: usize) -> Self {
        self.max_body_len = Some(bytes);
        self
    }

    /// Prepends `middleware` to this route's own middleware chain, run after global bundle
    /// middleware and before the route's handler. Used by [`group`]/[`provide`]/[`handler`] to
    /// scope middleware to a subset of routes rather than the whole application.
    #[must_use]
    fn with_middleware(mut self, middleware: MiddlewareFn) -> Self {
        self.middleware.insert(0, middleware);
        self
    }

    #[must_use]
    pub(crate) fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub(crate) fn middleware(&self) -> &[MiddlewareFn] {
        &self.middleware
    }

    #[must_use]
    pub(crate) fn max_body_len_override(&self) -> Option<usize> {
        self.max_body_len
    }

    pub(crate) fn invoke<'r>(&self, ctx: &'r Context<'r>) -> Response {
        (self.handler)(ctx)
    }
}

/// Builds a `GET` route. Shorthand for [`RouteDef::new`] with the method fixed.
#[must_use]
pub fn get<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("GET", path, handler)
}

/// Builds a `POST` route, body parsing left to whatever [`crate::extract::Json`] (or other
/// [`FromContext`]) parameters the handler declares.
#[must_use]
pub fn post<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("POST", path, handler)
}

/// Builds a `PUT` route.
#[must_use]
pub fn put<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("PUT", path, handler)
}

/// Builds a `DELETE` route.
#[must_use]
pub fn delete<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("DELETE", path, handler)
}

/// Builds a `PATCH` route.
#[must_use]
pub fn patch<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("PATCH", path, handler)
}

/// Builds a `HEAD` route.
#[must_use]
pub fn head<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("HEAD", path, handler)
}

/// Builds an `OPTIONS` route.
#[must_use]
pub fn options<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("OPTIONS", path, handler)
}

/// Builds a `POST` route whose handler takes no request body.
///
/// In the source this spec was distilled from, `postN`/`put0`/`patch0` variants skip body
/// parsing outright, as an optimization. Tokamak always buffers the body once at the
/// transport edge (`BuiltApplication::serve`) regardless of route, and a handler only pays
/// for JSON decoding if one of its parameters is a [`crate::extract::Json<T>`] - so `post0`
/// is behaviorally identical to [`post`] here. Kept as a distinct name purely for parity with
/// the Route DSL surface, so a handler's signature (no `Json<T>` parameter) and its route
/// declaration agree on paper.
#[must_use]
pub fn post0<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("POST", path, handler)
}

/// Builds a `PUT` route whose handler takes no request body. See [`post0`].
#[must_use]
pub fn put0<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("PUT", path, handler)
}

/// Builds a `PATCH` route whose handler takes no request body. See [`post0`].
#[must_use]
pub fn patch0<F, Args>(path: impl Into<Cow<'static, str>>, handler: F) -> RouteDef
where
    F: Handler<Args> + Copy + Send + Sync + 'static,
    Args: for<'r> FromContext<'r> + 'static,
    F::Output: IntoResponse,
{
    RouteDef::new("PATCH", path, handler)
}

/// Builds a `GET` route that always answers with `value`'s [`IntoResponse`] rendering,
/// computed once up front rather than per request.
#[must_use]
pub fn send(path: impl Into<Cow<'static, str>>, value: impl IntoResponse) -> RouteDef {
    RouteDef::constant(Method::Get, path, value.into_response())
}

/// Builds a `GET` route that always redirects (`302 Found`) to `location`.
#[must_use]
pub fn redirect(path: impl Into<Cow<'static, str>>, location: impl AsRef<str>) -> RouteDef {
    let response = Response::with_status(http::StatusCode::FOUND)
        .header(header::LOCATION, location.as_ref());
    RouteDef::constant(Method::Get, path, response)
}

/// Mounts `children` under `prefix`, concatenating it onto each child's path.
///
/// The source this spec was distilled from strips the matched prefix from the request path
/// at dispatch time as a group node descends - a shape built for a recursive route tree
/// walked per request. Tokamak's route table is flat and fully resolved at build time (see
/// [`Router`]'s own doc comment for why), so the equivalent - and equally correct, since the
/// only observable effect is which full path matches - is to fold the prefix into each
/// child's path pattern once, here, rather than re-deriving it on every request.
#[must_use]
pub fn group(prefix: &str, children: Vec<RouteDef>) -> Vec<RouteDef> {
    let prefix = prefix.trim_end_matches('/');

    children
        .into_iter()
        .map(|mut route| {
            route.path = Cow::Owned(format!("{prefix}{}", route.path));
            route
        })
        .collect()
}

/// Wraps `children` with a middleware that resolves a value from the request [`Context`],
/// makes it available to every parameter resolved further down the chain via
/// [`Context::provide`]/[`crate::extract::Extension`], and only then continues.
///
/// `factory` receives the [`Context`] directly rather than an arbitrary resolved-from-DI
/// parameter list: it can already reach every other ambient type (`&Request`, registered
/// services via `ctx.scope()`) through the context, so a second copy of the
/// [`Handler`]/[`FromContext`] tuple machinery for this one call site would add no
/// expressiveness, only a second tuple-arity ceiling to maintain.
#[must_use]
pub fn provide<T, F>(factory: F, children: Vec<RouteDef>) -> Vec<RouteDef>
where
    T: Send + Sync + 'static,
    F: for<'r> Fn(&Context<'r>) -> ConstructionResult<T> + Send + Sync + 'static,
{
    let middleware: MiddlewareFn = Arc::new(move |ctx: &Context<'_>| {
        let value = factory(ctx)?;
        ctx.provide(value);
        ctx.next()
    });

    children
        .into_iter()
        .map(|route| route.with_middleware(Arc::clone(&middleware)))
        .collect()
}

/// Wraps `children` with a plain middleware - one that either responds (via
/// [`Context::respond`]) or calls [`Context::next`] to continue - without pushing anything
/// into scope. Unlike [`provide`], the middleware is responsible for its own control flow.
#[must_use]
pub fn handler(middleware: MiddlewareFn, children: Vec<RouteDef>) -> Vec<RouteDef> {
    children
        .into_iter()
        .map(|route| route.with_middleware(Arc::clone(&middleware)))
        .collect()
}

/// Implemented by controller types whose `impl` block was annotated with `#[router]`,
/// collecting every `#[route(...)]`-annotated method into a flat list.
///
/// Always implemented by the `#[router]` macro; implementing it by hand is unusual but
/// supported, e.g. to assemble routes programmatically.
pub trait Routed {
    /// The routes this controller declares.
    fn route_defs() -> Vec<RouteDef>;
}

/// A compiled, matchable set of [`RouteDef`]s.
///
/// Matching walks the list in registration order and returns the first route whose method
/// and path both match - this is a deliberately simple "table scan" rather than a trie,
/// which keeps the duplicate-parameter-name and wildcard-position checks (done once, at
/// build time, in [`PathPattern::parse`]) the only source of build-time route errors.
pub struct Router {
    entries: Vec<(PathPattern, RouteDef)>,
}

impl Router {
    /// Starts an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers every route declared by `T`.
    ///
    /// # Errors
    /// Returns [`RouteBuildError`] if any of `T`'s path patterns are malformed (duplicate
    /// parameter name, misplaced wildcard, missing leading slash, or too many parameters).
    pub fn mount<T: Routed>(mut self) -> Result<Self, RouteBuildError> {
        for route in T::route_defs() {
            let pattern = PathPattern::parse(route.path().to_owned())?;
            self.entries.push((pattern, route));
        }
        Ok(self)
    }

    /// Registers a single, already-built route.
    ///
    /// # Errors
    /// Returns [`RouteBuildError`] if `route`'s path pattern is malformed.
    pub fn route(mut self, route: RouteDef) -> Result<Self, RouteBuildError> {
        let pattern = PathPattern::parse(route.path())?;
        self.entries.push((pattern, route));
        Ok(self)
    }

    /// Finds the first route matching `method` and `path`, returning it along with the
    /// captured path parameter values in declaration order.
    #[must_use]
    pub(crate) fn find(&self, method: Method, path: &str) -> Option<(&RouteDef, Vec<String>)> {
        self.entries.iter().find_map(|(pattern, route)| {
            if route.method() != method {
                return None;
            }
            pattern
                .matches(path)
                .map(|captures| (route, captures.into_iter().map(|c| c.into_owned()).collect()))
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PathParams;
    use bumpalo::Bump;
    use tokamak_inject::{Refs, ServiceCollection};

    fn hello() -> &'static str {
        "hello"
    }

    #[test]
    fn finds_first_matching_route_in_order() {
        let router = Router::new()
            .route(RouteDef::new("GET", "/users/:id", hello))
            .unwrap();

        let (route, params) = router.find(Method::Get, "/users/42").unwrap();
        assert_eq!(params, vec!["42".to_owned()]);

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            Method::Get,
            "/users/42".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::new(params), &[], scope);
                let response = route.invoke(&ctx);
                assert_eq!(response.status_code(), http::StatusCode::OK);
            })
            .unwrap();
    }

    #[test]
    fn missing_method_does_not_match() {
        let router = Router::new()
            .route(RouteDef::new("GET", "/users/:id", hello))
            .unwrap();

        assert!(router.find(Method::Post, "/users/42").is_none());
    }

    #[test]
    fn group_prefixes_child_paths() {
        let routes = group("/api", vec![get("/", hello), get("/users/:id", hello)]);
        let paths: Vec<&str> = routes.iter().map(RouteDef::path).collect();
        assert_eq!(paths, vec!["/api/", "/api/users/:id"]);
    }

    #[test]
    fn send_always_answers_with_the_same_body() {
        let router = Router::new().route(send("/version", "v1")).unwrap();
        let (route, _) = router.find(Method::Get, "/version").unwrap();

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            Method::Get,
            "/version".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                let response = route.invoke(&ctx);
                assert_eq!(response.status_code(), http::StatusCode::OK);
            })
            .unwrap();
    }

    #[test]
    fn redirect_answers_with_found_and_location() {
        let router = Router::new().route(redirect("/old", "/new")).unwrap();
        let (route, _) = router.find(Method::Get, "/old").unwrap();

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            Method::Get,
            "/old".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                let response = route.invoke(&ctx);
                assert_eq!(response.status_code(), http::StatusCode::FOUND);
                assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/new");
            })
            .unwrap();
    }

    #[test]
    fn provide_pushes_a_value_the_handler_receives_via_extension() {
        use crate::extract::Extension;

        #[derive(Clone)]
        struct CallerId(u32);

        fn whoami(Extension(caller): Extension<CallerId>) -> String {
            caller.0.to_string()
        }

        let routes = provide(|_ctx: &Context<'_>| Ok(CallerId(7)), vec![get("/me", whoami)]);
        let router = Router::new().route(routes.into_iter().next().unwrap()).unwrap();
        let (route, params) = router.find(Method::Get, "/me").unwrap();

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            Method::Get,
            "/me".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        let route = route.clone();
        let mut chain: Vec<MiddlewareFn> = route.middleware().iter().cloned().collect();
        chain.push(Arc::new(move |ctx: &Context<'_>| Ok(route.invoke(ctx))));

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::new(params), &chain, scope);
                let response = ctx.next().unwrap();
                assert_eq!(response.status_code(), http::StatusCode::OK);
                assert_eq!(response.into_parts().2.as_ref(), b"7");
            })
            .unwrap();
    }
}
