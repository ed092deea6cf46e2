/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Structured logging setup. A thin wrapper around `tracing-subscriber`'s env-filter layer -
//! applications are free to set up their own subscriber instead and skip this entirely.

use tracing_subscriber::EnvFilter;

/// Installs a global [`tracing`] subscriber that reads its filter from `RUST_LOG`, falling
/// back to `info` if unset or invalid.
///
/// Call this once, at the very start of `main`. Safe to skip if the host application already
/// installs its own subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
