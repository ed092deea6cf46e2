/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use std::{
    any::{TypeId, type_name},
    fmt::Display,
};

#[derive(Debug, Clone)]
pub struct ServiceToken {
    type_id: TypeId,
    type_name: &'static str,
}

struct Root;

impl ServiceToken {
    pub fn create<TService: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<TService>(),
            type_name: type_name::<TService>(),
        }
    }

    /// A sentinel token representing the root of a dependency chain, used by [`Injector`]
    /// handles that were not obtained while resolving some other service (e.g. a
    /// request-scope root borrowed directly from a [`ServiceProvider`]).
    ///
    /// [`Injector`]: crate::Injector
    /// [`ServiceProvider`]: crate::ServiceProvider
    pub(crate) fn root() -> Self {
        Self::create::<Root>()
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn type_name(&self) -> &str {
        self.type_name
    }
}

impl Display for ServiceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
