/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Expansion logic for the `#[injectable]` attribute macro, split out of the thin
//! `tokamak_inject_macros` proc-macro crate so it can be unit-tested as plain Rust.

mod dummy;
mod expand;
mod internals;

use proc_macro2::TokenStream;

pub use expand::expand_injectable;

/// Expands `#[injectable]`, converting any parse/validation error into a `compile_error!`
/// token stream so the attribute macro front-end never has to deal with `syn::Result`.
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand_injectable(attr, item).unwrap_or_else(syn::Error::into_compile_error)
}
