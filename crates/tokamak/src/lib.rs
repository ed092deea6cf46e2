/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, feature(rustdoc_internals))]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "README.md"))]

#[cfg(feature = "macros")]
extern crate tokamak_macros;

pub mod app;
pub mod bundle;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod method;
pub mod observability;
pub mod path;
pub mod request;
pub mod response;
pub mod routing;

pub use app::{Application, ApplicationError, BuiltApplication};
pub use bundle::Bundle;
pub use config::{AppConfig, BindAddress};
pub use context::{Context, FromContext, Handler, MiddlewareFn, ResponseMut};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, ErrorHandlerFn};
pub use extract::{Dep, Extension, Json, Path};
pub use method::Method;
pub use observability::init_tracing;
pub use path::RouteBuildError;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use routing::{
    RouteDef, Routed, Router, delete, get, group, handler, head, options, patch, patch0, post,
    post0, provide, put, put0, redirect, send,
};

#[cfg(feature = "macros")]
pub use tokamak_macros::{route, router};

pub use tokamak_inject::{
    ConstructionError, ConstructionResult, Injectable, InjectionError, InjectionResult,
    ServiceCollection, ServiceProvider,
};
