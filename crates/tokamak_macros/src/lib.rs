/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

mod internals;
mod router;

/// Derives [`tokamak::routing::Routed`] for an inherent `impl` block by collecting every
/// method tagged with `#[route("METHOD /path")]` into a flat [`tokamak::routing::RouteDef`]
/// list. Non-`#[route]` methods are left untouched.
#[proc_macro_attribute]
pub fn router(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    router::expand(attr.into(), item.into()).into()
}

/// Marks a method inside a `#[router]`-annotated `impl` block as a route, e.g.
/// `#[route("GET /users/:id")]`. Has no effect on its own; `#[router]` reads and strips it.
#[proc_macro_attribute]
pub fn route(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    router::expand_route(item.into()).into()
}
