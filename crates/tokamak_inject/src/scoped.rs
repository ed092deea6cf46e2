/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use crate::{
    injectable::FromInjector,
    injection_error::{ConstructionResult, InjectionResult},
    injector::Injector,
};
use std::any::{Any, TypeId};

/// A small set of ad-hoc, borrowed values keyed by type, handed to [`Injector::push`] to
/// extend what a [`ScopedInjector`] can resolve beyond what was registered in the
/// container. Used for per-call ambient values (a request, a response builder, an
/// allocator) that have no business being registered as services.
pub struct Refs<'i> {
    entries: Vec<(TypeId, &'i dyn Any)>,
}

impl<'i> Refs<'i> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with<T: 'static>(mut self, value: &'i T) -> Self {
        self.entries.push((TypeId::of::<T>(), value));
        self
    }

    fn get<T: 'static>(&self) -> Option<&T> {
        let type_id = TypeId::of::<T>();
        self.entries
            .iter()
            .rev()
            .find(|(id, _)| *id == type_id)
            .map(|(_, value)| {
                value
                    .downcast_ref::<T>()
                    .expect("type id match implies downcast success")
            })
    }
}

impl<'i> Default for Refs<'i> {
    fn default() -> Self {
        Self::new()
    }
}

enum ScopedParent<'i> {
    Root(&'i Injector<'i>),
    Nested(&'i ScopedInjector<'i>),
}

/// A request-scoped, LIFO, parent-chained extension of an [`Injector`]. Values pushed via
/// [`Injector::push`] or [`ScopedInjector::push`] shadow any value of the same type pushed
/// further up the chain; lookups that miss fall through to the underlying [`Injector`].
pub struct ScopedInjector<'i> {
    refs: Refs<'i>,
    parent: ScopedParent<'i>,
}

impl<'i> ScopedInjector<'i> {
    pub(crate) fn from_injector(injector: &'i Injector<'i>, refs: Refs<'i>) -> Self {
        Self {
            refs,
            parent: ScopedParent::Root(injector),
        }
    }

    /// Pushes another LIFO frame of ad-hoc values in front of this one.
    #[must_use]
    pub fn push(&'i self, refs: Refs<'i>) -> ScopedInjector<'i> {
        ScopedInjector {
            refs,
            parent: ScopedParent::Nested(self),
        }
    }

    /// Looks up a pushed ad-hoc value by type, most-recently-pushed first. Does not consult
    /// the underlying container - container services are reached through [`resolve`].
    ///
    /// [`resolve`]: ScopedInjector::resolve
    #[must_use]
    pub fn get_ref<T: 'static>(&self) -> Option<&T> {
        if let Some(value) = self.refs.get::<T>() {
            return Some(value);
        }

        match &self.parent {
            ScopedParent::Root(_) => None,
            ScopedParent::Nested(scoped) => scoped.get_ref::<T>(),
        }
    }

    /// The underlying [`Injector`] at the root of this scope chain.
    #[must_use]
    pub fn injector(&self) -> &'i Injector<'i> {
        match &self.parent {
            ScopedParent::Root(injector) => injector,
            ScopedParent::Nested(scoped) => scoped.injector(),
        }
    }

    /// Resolves a registered service from the underlying container.
    pub fn resolve<TService: 'static>(&self) -> InjectionResult<TService> {
        self.injector().resolve::<TService>()
    }

    /// Invokes `f`, resolving each of its parameters from this scope. Parameter types must
    /// implement [`FromScope`] - every type that implements [`FromInjector`] does so
    /// automatically, and ambient types (a request, a response, the scope itself) can
    /// implement [`FromScope`] directly to read from pushed [`Refs`].
    pub fn call<F, Args>(&self, f: F) -> ConstructionResult<F::Output>
    where
        F: Callable<Args>,
        Args: FromScope<'i>,
    {
        let args = Args::from_scope(self)?;
        Ok(f.call(args))
    }
}

/// Conversion of a value (or tuple of values) out of a [`ScopedInjector`], used to resolve
/// the parameters of a call made through [`ScopedInjector::call`].
pub trait FromScope<'i>: Sized {
    fn from_scope(scope: &ScopedInjector<'i>) -> ConstructionResult<Self>;
}

impl<'i, T: FromInjector> FromScope<'i> for T {
    fn from_scope(scope: &ScopedInjector<'i>) -> ConstructionResult<Self> {
        T::from_injector(scope.injector())
    }
}

/// A handler-like callable whose arguments are resolved from a [`ScopedInjector`]. Blanket
/// implementations exist for plain `Fn(Args...) -> Output` closures and function items up
/// to a fixed arity, mirroring how `axum::handler::Handler` is implemented for tuples of
/// extractors.
pub trait Callable<Args> {
    type Output;

    fn call(self, args: Args) -> Self::Output;
}

macro_rules! impl_from_scope_tuple {
    ($($ty:ident),*) => {
        impl<'i, $($ty: FromScope<'i>),*> FromScope<'i> for ($($ty,)*) {
            #[allow(unused_variables, clippy::unused_unit)]
            fn from_scope(scope: &ScopedInjector<'i>) -> ConstructionResult<Self> {
                Ok(($($ty::from_scope(scope)?,)*))
            }
        }
    };
}

macro_rules! impl_callable_tuple {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_parens)]
        impl<Func, Output, $($ty),*> Callable<($($ty,)*)> for Func
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

impl_from_scope_tuple!();
impl_from_scope_tuple!(A);
impl_from_scope_tuple!(A, B);
impl_from_scope_tuple!(A, B, C);
impl_from_scope_tuple!(A, B, C, D);
impl_from_scope_tuple!(A, B, C, D, E);
impl_from_scope_tuple!(A, B, C, D, E, F);
impl_from_scope_tuple!(A, B, C, D, E, F, G);
impl_from_scope_tuple!(A, B, C, D, E, F, G, H);

impl_callable_tuple!();
impl_callable_tuple!(A);
impl_callable_tuple!(A, B);
impl_callable_tuple!(A, B, C);
impl_callable_tuple!(A, B, C, D);
impl_callable_tuple!(A, B, C, D, E);
impl_callable_tuple!(A, B, C, D, E, F);
impl_callable_tuple!(A, B, C, D, E, F, G);
impl_callable_tuple!(A, B, C, D, E, F, G, H);
