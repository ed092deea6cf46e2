/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

use crate::internals::Ctxt;
use syn::LitStr;

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// A single `#[route("METHOD /path")]` declaration, parsed from its string literal.
pub(crate) struct RouteSpec {
    pub(crate) method: String,
    pub(crate) path: String,
}

impl RouteSpec {
    pub(crate) fn parse(cx: &Ctxt, lit: &LitStr) -> Option<Self> {
        let spec = lit.value();

        let Some((method, path)) = spec.split_once(' ') else {
            cx.error_spanned_by(
                lit,
                format!("expected `\"METHOD /path\"`, found {spec:?}"),
            );
            return None;
        };

        if !METHODS.contains(&method) {
            cx.error_spanned_by(
                lit,
                format!(
                    "unknown HTTP method {method:?}, expected one of {}",
                    METHODS.join(", ")
                ),
            );
            return None;
        }

        if !path.starts_with('/') {
            cx.error_spanned_by(lit, format!("route path must start with `/`, found {path:?}"));
            return None;
        }

        Some(RouteSpec {
            method: method.to_owned(),
            path: path.to_owned(),
        })
    }
}
