/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! The incoming half of a request/response pair.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Uri};

use crate::method::Method;

/// An already-buffered incoming request, independent of the transport that produced it.
///
/// Unlike `axum::extract::Request`, the body is read to completion before a [`Request`] is
/// constructed - handlers resolve their body extractor ([`crate::extract::Json`]) from the
/// buffered [`Bytes`] rather than streaming it, matching the "arena-scoped, synchronous
/// extraction" model the rest of the request lifecycle uses.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Builds a request directly, bypassing the `axum`/`hyper` transport edge - the shape a
    /// test harness (or an alternate transport adapter) constructs a [`Request`] with.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, excluding the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The raw query string, if any, excluding the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// The full request target.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Looks up a single header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v: &HeaderValue| v.to_str().ok())
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw, buffered request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
