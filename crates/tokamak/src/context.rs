/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! The per-request [`Context`]: a bump arena, a scoped injector, and the middleware chain
//! that eventually reaches the matched handler.

use std::cell::Cell;
use std::sync::Arc;

use bumpalo::Bump;
use tokamak_inject::{ConstructionResult, Refs, ScopedInjector};

use crate::request::Request;
use crate::response::Response;

/// A single link in the middleware chain. Middleware reads/writes through [`Context`] and
/// calls [`Context::next`] to continue the chain; the final link is always the matched
/// route's handler, already bound to its arguments.
///
/// The reference and the [`Context`] it points to share the same lifetime `'r` - tying them
/// together (rather than leaving the reference's own lifetime elided) is what lets
/// [`FromContext`] hand out `&'r Context<'r>` itself as an ambient parameter.
pub type MiddlewareFn = Arc<dyn for<'r> Fn(&'r Context<'r>) -> ConstructionResult<Response> + Send + Sync>;

/// Captured `:name` path parameters for the matched route, in declaration order.
#[derive(Debug, Default, Clone)]
pub(crate) struct PathParams {
    values: Vec<String>,
}

impl PathParams {
    pub(crate) fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    fn next(&self, cursor: &Cell<usize>) -> Option<&str> {
        let index = cursor.get();
        let value = self.values.get(index)?;
        cursor.set(index + 1);
        Some(value.as_str())
    }
}

/// Everything a handler or middleware needs for the lifetime of a single request: the
/// inbound [`Request`], the [`Response`] being accumulated, a bump [`Bump`] arena for
/// scratch allocations, and a [`ScopedInjector`] for resolving dependencies.
///
/// Path parameters are handed out positionally, in the order they appear in the route
/// pattern, via an internal cursor - this is what lets [`crate::extract::Path`] bind the
/// *next* unconsumed `:name` segment without the handler needing to name it again.
pub struct Context<'r> {
    arena: &'r Bump,
    request: &'r Request,
    response: std::cell::RefCell<Response>,
    responded: Cell<bool>,
    path_params: PathParams,
    path_cursor: Cell<usize>,
    chain: &'r [MiddlewareFn],
    cursor: Cell<usize>,
    scope: Cell<&'r ScopedInjector<'r>>,
}

impl<'r> Context<'r> {
    pub(crate) fn new(
        arena: &'r Bump,
        request: &'r Request,
        path_params: PathParams,
        chain: &'r [MiddlewareFn],
        scope: &'r ScopedInjector<'r>,
    ) -> Self {
        Self {
            arena,
            request,
            response: std::cell::RefCell::new(Response::new()),
            responded: Cell::new(false),
            path_params,
            path_cursor: Cell::new(0),
            chain,
            cursor: Cell::new(0),
            scope: Cell::new(scope),
        }
    }

    /// The bump arena backing this request. Scratch allocations made here are freed in bulk
    /// when the request finishes.
    #[must_use]
    pub fn arena(&self) -> &'r Bump {
        self.arena
    }

    /// The inbound request.
    #[must_use]
    pub fn request(&self) -> &'r Request {
        self.request
    }

    /// The scoped injector for this request, for resolving registered services directly.
    ///
    /// Reflects the most recent [`Context::provide`] call, if any - each push shadows what
    /// came before for the remainder of the request.
    #[must_use]
    pub fn scope(&self) -> &'r ScopedInjector<'r> {
        self.scope.get()
    }

    /// Makes `value` available to every parameter resolved for the remainder of this request
    /// (via [`crate::extract::Extension`]) without registering it as a container service.
    ///
    /// Backs [`provide`]/[`crate::routing::provide`]'s "push the resolved value onto the
    /// scoped injector" step (§4.B `Injector::push`, §9 "Request-scoped injection"). The
    /// pushed frame and the value itself are both arena-allocated so they live exactly as
    /// long as the request does.
    ///
    /// [`provide`]: crate::routing::provide
    pub fn provide<T: Send + Sync + 'static>(&self, value: T) -> &'r T {
        let value_ref: &'r T = self.arena.alloc(value);
        let refs = Refs::new().with(value_ref);
        let pushed = self.scope.get().push(refs);
        let pushed_ref: &'r ScopedInjector<'r> = self.arena.alloc(pushed);
        self.scope.set(pushed_ref);
        value_ref
    }

    /// Replaces the in-progress response and marks this context as having responded,
    /// meaning a handler's own return value will be discarded in favor of it.
    pub fn respond(&self, response: Response) {
        *self.response.borrow_mut() = response;
        self.responded.set(true);
    }

    /// Whether [`Context::respond`] has already been called during this request.
    #[must_use]
    pub fn has_responded(&self) -> bool {
        self.responded.get()
    }

    /// Takes the accumulated response, replacing it with a fresh default.
    pub(crate) fn take_response(&self) -> Response {
        self.response.replace(Response::new())
    }

    /// Returns the next unconsumed path parameter value, advancing the cursor.
    ///
    /// Parameters are consumed in declaration order; each handler parameter backed by
    /// [`crate::extract::Path`] claims the next one, left to right, exactly once - the
    /// resolution order guaranteed by `tokamak_inject`'s tuple-argument binding.
    #[must_use]
    pub(crate) fn next_path_param(&self) -> Option<&str> {
        self.path_params.next(&self.path_cursor)
    }

    /// Invokes the next link in the middleware chain (or the handler, once middleware is
    /// exhausted), advancing the shared cursor.
    ///
    /// Takes `&'r self` rather than an ordinary elided `&self`: each link in the chain is a
    /// [`MiddlewareFn`] expecting `&'r Context<'r>`, so the call can only be made on a
    /// reference that already carries the request's full lifetime.
    pub fn next(&'r self) -> ConstructionResult<Response> {
        let index = self.cursor.get();
        let Some(func) = self.chain.get(index) else {
            return Ok(self.take_response());
        };
        self.cursor.set(index + 1);
        func(self)
    }
}

/// Conversion of a handler parameter out of a request [`Context`].
///
/// Ambient, per-request types - [`crate::extract::Path`], [`crate::extract::Json`], the
/// context itself - implement it directly against the context; registered services implement
/// [`tokamak_inject::FromInjector`] instead and are bound through [`crate::extract::Dep`],
/// since a blanket `impl<T: FromInjector> FromContext for T` would overlap with these concrete
/// impls (a local trait's blanket impl over a bare type parameter can't coexist with impls for
/// specific types - the compiler can't rule out some future `T` satisfying both).
pub trait FromContext<'r>: Sized {
    /// Produces `Self` from the given request context.
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self>;
}

impl<'r> FromContext<'r> for &'r Request {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        Ok(ctx.request())
    }
}

/// Binds the request-scoped bump arena (§4.B "if `P_i == Allocator`, bind the request
/// arena"), for handlers that need scratch allocations living exactly as long as the
/// request.
impl<'r> FromContext<'r> for &'r Bump {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        Ok(ctx.arena())
    }
}

/// Binds the root [`tokamak_inject::Injector`] directly (§4.B "if `P_i == *Injector`, bind
/// the ambient object"), for handlers that need to resolve services the ordinary parameter
/// list can't express (e.g. resolving by a runtime-chosen type).
impl<'r> FromContext<'r> for &'r tokamak_inject::Injector<'r> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        Ok(ctx.scope().injector())
    }
}

/// Binds the ambient [`Context`] itself (§4.B "if `P_i == *Context`, bind the ambient
/// object"), for handlers and middleware that need to reach request state - path params,
/// the scoped injector, [`Context::provide`] - beyond what an ordinary parameter expresses.
impl<'r> FromContext<'r> for &'r Context<'r> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        Ok(ctx)
    }
}

/// Binds the ambient in-flight response (§4.B "if `P_i == *Response`, bind the ambient
/// object"), for a handler that writes the response directly - via [`ResponseMut::set`],
/// which is exactly [`Context::respond`] - instead of returning a value for
/// [`crate::response::IntoResponse`] to convert.
pub struct ResponseMut<'r>(&'r Context<'r>);

impl ResponseMut<'_> {
    /// Replaces the in-flight response and marks the request as responded, same as
    /// [`Context::respond`].
    pub fn set(&self, response: Response) {
        self.0.respond(response);
    }
}

impl<'r> FromContext<'r> for ResponseMut<'r> {
    fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
        Ok(ResponseMut(ctx))
    }
}

macro_rules! impl_from_context_tuple {
    ($($ty:ident),*) => {
        impl<'r, $($ty: FromContext<'r>),*> FromContext<'r> for ($($ty,)*) {
            #[allow(unused_variables, clippy::unused_unit)]
            fn from_context(ctx: &'r Context<'r>) -> ConstructionResult<Self> {
                Ok(($($ty::from_context(ctx)?,)*))
            }
        }
    };
}

impl_from_context_tuple!();
impl_from_context_tuple!(A);
impl_from_context_tuple!(A, B);
impl_from_context_tuple!(A, B, C);
impl_from_context_tuple!(A, B, C, D);
impl_from_context_tuple!(A, B, C, D, E);
impl_from_context_tuple!(A, B, C, D, E, F);
impl_from_context_tuple!(A, B, C, D, E, F, G);
impl_from_context_tuple!(A, B, C, D, E, F, G, H);

/// A handler-like callable whose arguments are resolved from a [`Context`], mirroring
/// `axum::handler::Handler`'s tuple-of-extractors blanket impls.
pub trait Handler<Args> {
    /// What the handler returns, converted to a [`Response`] via
    /// [`crate::response::IntoResponse`].
    type Output;

    /// Invokes the handler with its already-extracted arguments.
    fn call(self, args: Args) -> Self::Output;
}

macro_rules! impl_handler_tuple {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_parens)]
        impl<Func, Output, $($ty),*> Handler<($($ty,)*)> for Func
        where
            Func: FnOnce($($ty),*) -> Output,
        {
            type Output = Output;

            fn call(self, ($($ty,)*): ($($ty,)*)) -> Output {
                (self)($($ty),*)
            }
        }
    };
}

impl_handler_tuple!();
impl_handler_tuple!(A);
impl_handler_tuple!(A, B);
impl_handler_tuple!(A, B, C);
impl_handler_tuple!(A, B, C, D);
impl_handler_tuple!(A, B, C, D, E);
impl_handler_tuple!(A, B, C, D, E, F);
impl_handler_tuple!(A, B, C, D, E, F, G);
impl_handler_tuple!(A, B, C, D, E, F, G, H);
