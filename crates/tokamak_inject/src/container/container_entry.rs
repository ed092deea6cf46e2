/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use crate::{
    injection_error::{ConstructionError, ConstructionResult, InjectionError, InjectionResult},
    injector::Injector,
    service_token::ServiceToken,
};
use std::any::Any;

/// Type-erased counterpart of [`ContainerEntry`], stored in a container's entry map keyed by
/// `TypeId`. Resolution always goes through the typed entry recovered via [`as_any`].
pub(crate) trait UntypedContainerEntry {
    fn as_any(&self) -> &dyn Any;
}

fn into_injection_result<TService>(
    result: ConstructionResult<TService>,
    injector: &Injector,
) -> InjectionResult<TService> {
    result.map_err(|err| match err {
        ConstructionError::InjectionError(injection_error) => injection_error,
        ConstructionError::Custom(error) => InjectionError::Custom {
            service: ServiceToken::create::<TService>(),
            dependency_chain: injector.resolve_dependency_chain(),
            source: error.into(),
        },
    })
}

/// A built, resolvable slot for a single service type. The construction strategy
/// (transient/singleton/scoped) was already chosen by the corresponding
/// `*ContainerEntryBuilder` at build time; this type only knows how to hand back a value.
pub(crate) enum ContainerEntry<TService> {
    Transient {
        factory: Box<dyn Fn(&Injector) -> ConstructionResult<TService> + Send + Sync>,
    },
    Resolved {
        resolved: InjectionResult<TService>,
        clone_resolved: fn(&InjectionResult<TService>) -> InjectionResult<TService>,
    },
}

impl<TService> ContainerEntry<TService> {
    pub(crate) fn transient(
        factory: Box<dyn Fn(&Injector) -> ConstructionResult<TService> + Send + Sync>,
    ) -> Self {
        Self::Transient { factory }
    }

    pub(crate) fn singleton(
        resolved: InjectionResult<TService>,
        clone_resolved: fn(&InjectionResult<TService>) -> InjectionResult<TService>,
    ) -> Self {
        Self::Resolved {
            resolved,
            clone_resolved,
        }
    }

    pub(crate) fn scoped(
        resolved: InjectionResult<TService>,
        clone_resolved: fn(&InjectionResult<TService>) -> InjectionResult<TService>,
    ) -> Self {
        Self::Resolved {
            resolved,
            clone_resolved,
        }
    }

    pub(crate) fn resolve(&self, injector: &Injector) -> InjectionResult<TService> {
        match self {
            Self::Transient { factory } => into_injection_result(factory(injector), injector),
            Self::Resolved {
                resolved,
                clone_resolved,
            } => clone_resolved(resolved),
        }
    }
}

impl<TService: 'static> UntypedContainerEntry for ContainerEntry<TService> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
