/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use crate::service_provider::ServiceProvider;

pub struct ServiceScope {
    service_provider: ServiceProvider,
}

impl ServiceScope {
    pub(crate) fn new(service_provider: ServiceProvider) -> Self {
        Self { service_provider }
    }

    pub fn service_provider(&self) -> &ServiceProvider {
        &self.service_provider
    }
}
