/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Local wrapper types through which handlers pull typed data out of a [`Context`] - coherence
//! keeps us from implementing [`FromContext`] directly for bare `u64`/`String`/`T: FromInjector`
//! (a blanket impl can't coexist with the concrete ambient impls in [`crate::context`]), so, as
//! `axum` does for its own extractors, path parameters, bodies and registered services are
//! always bound through one of these.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use http::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use tokamak_inject::{ConstructionResult, FromInjector};

use crate::context::{Context, FromContext};
use crate::error::DispatchError;
use crate::response::{IntoResponse, Response};

/// Binds the next unconsumed `:name` path segment, parsed via `T::from_str`.
///
/// Path parameters are claimed left to right: the first `Path<_>` parameter in a handler's
/// signature gets the route's first `:name` capture, the second gets the second, and so on -
/// the binding is positional by declaration order, not by parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path<T>(pub T);

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Path<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<'r, T> FromContext<'r> for Path<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        let Some(raw) = ctx.next_path_param() else {
            return Err(DispatchError::BadPathParam {
                name: "<unnamed>",
                source: Box::new(MissingPathParam),
            }
            .into());
        };

        raw.parse::<T>().map(Path).map_err(|err| {
            DispatchError::BadPathParam {
                name: "<unnamed>",
                source: Box::new(err),
            }
            .into()
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("route declared fewer path parameters than the handler expects")]
struct MissingPathParam;

/// Decodes the request body as JSON into `T`, or serializes `T` as the response body.
///
/// `Json<T>` plays both roles `axum::Json` does: as a handler parameter it implements
/// [`FromContext`] (decoding), and as a handler return value it implements
/// [`IntoResponse`] (encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<'r, T: DeserializeOwned> FromContext<'r> for Json<T> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        let body = ctx.request().body();

        if body.is_empty() {
            return Err(DispatchError::BadBody(Box::new(EmptyBody)).into());
        }

        serde_json::from_slice(body)
            .map(Json)
            .map_err(|err| DispatchError::BadBody(Box::new(err)).into())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("request body is empty")]
struct EmptyBody;

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        Response::json(StatusCode::OK, &self.0)
    }
}

/// Binds a value a middleware pushed onto the request's scoped injector via
/// [`Context::provide`], mirroring `axum::extract::Extension`.
///
/// A bare `T` can't implement [`FromContext`] itself for an arbitrary pushed type without
/// either specialization or an orphan-rule violation (the same reason [`Path`]/[`Json`] are
/// wrappers rather than blanket impls over `FromStr`/`Deserialize`), so a pushed value is
/// always extracted through this wrapper, not as a bare parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension<T>(pub T);

impl<T> Deref for Extension<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Extension<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<'r, T: Clone + Send + Sync + 'static> FromContext<'r> for Extension<T> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        ctx.scope()
            .get_ref::<T>()
            .cloned()
            .map(Extension)
            .ok_or(DispatchError::MissingExtension(std::any::type_name::<T>()).into())
    }
}

/// Binds a registered service out of the container, mirroring `axum::extract::State` (and
/// this crate's own [`Path`]/[`Json`]/[`Extension`]): a bare `T: FromInjector` can't implement
/// [`FromContext`] itself, since a blanket `impl<T: FromInjector> FromContext for T` would
/// overlap with the concrete ambient impls (`&Request`, `&Context`, ...) and the tuple impls
/// above - the compiler can't prove some future `T` won't satisfy both. Every `#[injectable]`
/// service handlers pull in as a plain parameter is therefore wrapped in `Dep<T>`.
#[derive(Debug, Clone, Copy)]
pub struct Dep<T>(pub T);

impl<T> Deref for Dep<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Dep<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<'r, T: FromInjector> FromContext<'r> for Dep<T> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        T::from_injector(ctx.scope().injector()).map(Dep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PathParams;
    use bumpalo::Bump;
    use tokamak_inject::{Refs, ServiceCollection};

    #[test]
    fn path_parses_in_declaration_order() {
        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            crate::method::Method::Get,
            "/".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );
        let params = PathParams::new(vec!["7".to_owned(), "eve".to_owned()]);

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, params, &[], scope);

                let Path(id) = <Path<u64> as FromContext>::from_context(&ctx).unwrap();
                assert_eq!(id, 7);
                let Path(name) = <Path<String> as FromContext>::from_context(&ctx).unwrap();
                assert_eq!(name, "eve");
            })
            .unwrap();
    }

    #[test]
    fn json_rejects_empty_body() {
        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            crate::method::Method::Post,
            "/".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                let result = <Json<serde_json::Value> as FromContext>::from_context(&ctx);
                assert!(result.is_err());
            })
            .unwrap();
    }

    #[test]
    fn extension_reads_a_value_pushed_by_provide() {
        #[derive(Clone, PartialEq, Eq, Debug)]
        struct CurrentUser(u32);

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            crate::method::Method::Get,
            "/".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                ctx.provide(CurrentUser(1));

                let Extension(user) = <Extension<CurrentUser> as FromContext>::from_context(&ctx)
                    .unwrap();
                assert_eq!(user, CurrentUser(1));
            })
            .unwrap();
    }

    #[test]
    fn dep_resolves_a_registered_service() {
        use tokamak_inject::injectable;

        #[derive(Clone)]
        struct Greeting(String);

        #[injectable]
        impl Greeting {
            fn new() -> Self {
                Self("hi".to_owned())
            }
        }

        let provider = ServiceCollection::new()
            .add_singleton::<Greeting>()
            .build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            crate::method::Method::Get,
            "/".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                let Dep(greeting) = <Dep<Greeting> as FromContext>::from_context(&ctx).unwrap();
                assert_eq!(greeting.0, "hi");
            })
            .unwrap();
    }

    #[test]
    fn extension_errors_when_nothing_was_provided() {
        #[derive(Clone)]
        struct Unprovided;

        let provider = ServiceCollection::new().build();
        let arena = Bump::new();
        let request = crate::request::Request::new(
            crate::method::Method::Get,
            "/".parse().unwrap(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
        );

        provider
            .resolve_scoped(Refs::new(), |scope| {
                let ctx = Context::new(&arena, &request, PathParams::default(), &[], scope);
                assert!(<Extension<Unprovided> as FromContext>::from_context(&ctx).is_err());
            })
            .unwrap();
    }
}
