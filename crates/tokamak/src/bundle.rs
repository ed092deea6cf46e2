/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Bundles: the unit of composition an [`crate::app::Application`] is assembled from. Each
//! bundle contributes service registrations, global middleware, and routes; bundles are
//! composed, never discovered at runtime.

use tokamak_inject::{ConstructionResult, ServiceCollection, ServiceProvider};

use crate::context::MiddlewareFn;
use crate::error::DispatchError;
use crate::path::RouteBuildError;
use crate::response::Response;
use crate::routing::Router;

/// A self-contained unit of application composition.
///
/// Bundles are plain values (usually zero-sized or carrying their own static config) added
/// to an [`crate::app::Application`] with [`crate::app::Application::bundle`]. Each of a
/// bundle's four hooks is optional and defaults to a no-op; override only the ones that
/// apply.
pub trait Bundle: Send + Sync + 'static {
    /// Registers this bundle's services into the shared [`ServiceCollection`]. Called once,
    /// before the container is built, in the order bundles were added.
    fn configure_services(&self, _services: &mut ServiceCollection) {}

    /// Appends this bundle's global middleware, outermost-first, to the chain every request
    /// runs through ahead of its matched handler.
    fn configure_middleware(&self, _middleware: &mut Vec<MiddlewareFn>) {}

    /// Mounts this bundle's routes onto the application's router.
    ///
    /// # Errors
    /// Returns [`RouteBuildError`] if any route this bundle declares has a malformed path
    /// pattern.
    fn configure_routes(&self, router: Router) -> Result<Router, RouteBuildError> {
        Ok(router)
    }

    /// Runs once, after the container has been built, with access to the fully assembled
    /// [`ServiceProvider`] - the place to kick off background work or validate
    /// configuration that depends on other bundles' services.
    ///
    /// # Errors
    /// Returns a [`tokamak_inject::ConstructionError`] if startup-time initialization
    /// fails; a failing bundle aborts [`crate::app::Application::build`] entirely.
    fn init(&self, _provider: &ServiceProvider) -> ConstructionResult<()> {
        Ok(())
    }

    /// Runs once at shutdown, in reverse addition order, mirroring `init`'s forward order
    /// (§4.C "deinit hooks (called in reverse)", §4.D "`deinit()` calls deinit hooks in
    /// reverse, then drops storage"). Also invoked, again in reverse, for every bundle whose
    /// `init` already succeeded when a later bundle's `init` fails, so a partially started
    /// application never leaks whatever a successful `init` acquired (§4.D "if any service
    /// fails to initialize, already-built services are deinitialized in reverse").
    fn deinit(&self, _provider: &ServiceProvider) {}

    /// Overrides the default error-to-response mapping for errors that reach the outermost
    /// funnel (§7). Returning `None` falls through to the next bundle's `error_handler`, and
    /// finally to [`DispatchError::into_response`]'s default JSON mapping - the funnel itself
    /// is always effective, so a response is never left partially written.
    fn error_handler(&self, _err: &DispatchError) -> Option<Response> {
        None
    }
}
