/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use crate::{
    container::Container,
    injection_error::{InjectionError, InjectionResult},
    injector::Injector,
    scoped::{Refs, ScopedInjector},
    service_token::ServiceToken,
    utils::{atomic_once_cell::AtomicOnceCell, ensure_send, ensure_sync},
};
use std::sync::{Arc, Weak};

const _: () = ensure_send::<ServiceProvider>();
const _: () = ensure_sync::<ServiceProvider>();

#[derive(Clone)]
pub struct ServiceProvider {
    inner: ServiceProviderInner,
}

impl ServiceProvider {
    pub(crate) fn create(container: Arc<AtomicOnceCell<Container>>) -> Self {
        Self {
            inner: ServiceProviderInner::Container(container),
        }
    }

    pub(crate) fn create_weak(container: Weak<AtomicOnceCell<Container>>) -> Self {
        Self {
            inner: ServiceProviderInner::ContainerWeak(container),
        }
    }

    fn resolve_from_container<TService: 'static>(
        container: &Arc<AtomicOnceCell<Container>>,
    ) -> InjectionResult<TService> {
        match container.get() {
            Some(container) => container.resolve_core(None),
            None => Err(InjectionError::UninitializedServiceProvider {
                service: ServiceToken::create::<TService>(),
                // TODO: Dependency chain is missing here! (Is it possible this is not the root call from the caller?)
                dependency_chain: Vec::new(),
            }),
        }
    }

    pub fn resolve<TService: 'static>(&self) -> InjectionResult<TService> {
        match &self.inner {
            ServiceProviderInner::Container(container) => Self::resolve_from_container(container),
            ServiceProviderInner::ContainerWeak(container_weak) => match container_weak.upgrade() {
                Some(container) => Self::resolve_from_container(&container),
                None => Err(InjectionError::DroppedServiceProvider {
                    service: ServiceToken::create::<TService>(),
                    // TODO: Dependency chain is missing here! (Is it possible this is not the root call from the caller?)
                    dependency_chain: Vec::new(),
                }),
            },
        }
    }

    /// Opens a root-level [`ScopedInjector`] on top of this provider's container and invokes
    /// `f` with it, extended with `refs`. Used once per request to make ambient,
    /// non-registered values (a request, a response, an allocator) available alongside
    /// whatever is registered in the container, without requiring the caller to hold onto a
    /// bare [`Injector`] (not exposed publicly, since its borrow of the underlying container
    /// is an implementation detail).
    ///
    /// Returns [`InjectionError::UninitializedServiceProvider`] if called before the
    /// originating [`crate::ServiceCollection`] finished building, and
    /// [`InjectionError::DroppedServiceProvider`] if called on a provider whose container has
    /// since been dropped (only possible for providers obtained from inside a factory, not
    /// for the root provider returned by [`crate::ServiceCollection::build`]).
    pub fn resolve_scoped<'i, R>(
        &'i self,
        refs: Refs<'i>,
        f: impl FnOnce(&ScopedInjector<'i>) -> R,
    ) -> InjectionResult<R> {
        let container = match &self.inner {
            ServiceProviderInner::Container(container) => container.get(),
            // Weak providers are an internal detail of scoped-service construction; they are
            // never handed to application code as the root provider, so scoping on one here
            // can only mean the container has already been torn down.
            ServiceProviderInner::ContainerWeak(_) => {
                return Err(InjectionError::DroppedServiceProvider {
                    service: ServiceToken::root(),
                    dependency_chain: Vec::new(),
                });
            }
        };

        let Some(container) = container else {
            return Err(InjectionError::UninitializedServiceProvider {
                service: ServiceToken::root(),
                dependency_chain: Vec::new(),
            });
        };

        let injector = Injector::from_container(container, ServiceToken::root(), None);
        let scope = injector.push(refs);
        Ok(f(&scope))
    }
}

#[derive(Clone)]
enum ServiceProviderInner {
    Container(Arc<AtomicOnceCell<Container>>),
    ContainerWeak(Weak<AtomicOnceCell<Container>>),
}
