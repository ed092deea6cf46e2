/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Bundle composition and the transport bootstrap: turns a list of [`Bundle`]s into a
//! running server, bridging to `axum`/`hyper` only at the very edge.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request as AxumRequest, State};
use axum::response::Response as AxumResponse;
use http_body_util::BodyExt;
use tokamak_inject::ServiceCollection;
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

use crate::bundle::Bundle;
use crate::config::{AppConfig, BindAddress};
use crate::dispatch::Dispatcher;
use crate::error::{DispatchError, ErrorHandlerFn};
use crate::method::Method;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::routing::Router;

/// Assembles [`Bundle`]s into a built, servable application.
///
/// Composition happens strictly in the order bundles are added: services registered by an
/// earlier bundle are visible (and, where `ServiceCollection` allows it, overridable) to
/// later ones, middleware runs in addition order, and routes are mounted in addition order
/// too (first match wins at dispatch time).
pub struct Application {
    bundles: Vec<Box<dyn Bundle>>,
}

impl Application {
    /// Starts an empty application.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: Vec::new(),
        }
    }

    /// Adds a bundle to the composition.
    #[must_use]
    pub fn bundle(mut self, bundle: impl Bundle) -> Self {
        self.bundles.push(Box::new(bundle));
        self
    }

    /// Runs every bundle's configuration and init hooks, building the dependency container
    /// and route tree into a ready-to-serve [`BuiltApplication`].
    ///
    /// # Errors
    /// Returns [`ApplicationError::Route`] if any bundle declares a malformed route, or
    /// [`ApplicationError::Init`] if any bundle's [`Bundle::init`] hook fails.
    pub fn build(self) -> Result<BuiltApplication, ApplicationError> {
        let mut services = ServiceCollection::new();
        let mut middleware = Vec::new();
        let mut router = Router::new();

        for bundle in &self.bundles {
            bundle.configure_services(&mut services);
            bundle.configure_middleware(&mut middleware);
            router = bundle
                .configure_routes(router)
                .map_err(ApplicationError::Route)?;
        }

        let provider = services.build();

        for (index, bundle) in self.bundles.iter().enumerate() {
            if let Err(err) = bundle.init(&provider) {
                for bundle in self.bundles[..index].iter().rev() {
                    bundle.deinit(&provider);
                }
                return Err(ApplicationError::Init(err));
            }
        }

        let bundles: Arc<[Box<dyn Bundle>]> = self.bundles.into();
        let error_handler: ErrorHandlerFn = {
            let bundles = Arc::clone(&bundles);
            Arc::new(move |err: &DispatchError| {
                bundles.iter().find_map(|bundle| bundle.error_handler(err))
            })
        };

        Ok(BuiltApplication {
            dispatcher: Arc::new(Dispatcher::new(router, provider.clone(), middleware, Some(error_handler))),
            provider,
            bundles,
        })
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything that can go wrong assembling an [`Application`].
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// A bundle declared a route with a malformed path pattern.
    #[error(transparent)]
    Route(#[from] crate::path::RouteBuildError),
    /// A bundle's [`Bundle::init`] hook failed.
    #[error("bundle initialization failed: {0}")]
    Init(#[source] tokamak_inject::ConstructionError),
}

/// A fully assembled application, ready to serve traffic.
pub struct BuiltApplication {
    dispatcher: Arc<Dispatcher>,
    provider: tokamak_inject::ServiceProvider,
    bundles: Arc<[Box<dyn Bundle>]>,
}

impl BuiltApplication {
    /// Binds according to `config` and serves until `shutdown` is cancelled, then finishes
    /// in-flight requests before running every bundle's [`Bundle::deinit`] hook, in reverse
    /// addition order (§4.D "`deinit()` calls deinit hooks in reverse, then drops storage").
    ///
    /// # Errors
    /// Returns an [`std::io::Error`] if binding the listening socket fails.
    pub async fn serve(
        self,
        config: &AppConfig,
        shutdown: CancellationToken,
    ) -> std::io::Result<()> {
        let axum_router = axum::Router::new()
            .fallback(handle_request)
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .with_state(Arc::clone(&self.dispatcher));

        let result = match &config.bind {
            BindAddress::Tcp(addrs) => {
                let mut listeners = Vec::with_capacity(addrs.len());
                for addr in addrs {
                    listeners.push(TcpListener::bind(addr).await?);
                    tracing::info!(%addr, "listening");
                }

                let mut handles = Vec::with_capacity(listeners.len());
                for listener in listeners {
                    let axum_router = axum_router.clone();
                    let shutdown = shutdown.clone();
                    handles.push(tokio::spawn(async move {
                        axum::serve(listener, axum_router)
                            .with_graceful_shutdown(shutdown.cancelled_owned())
                            .await
                    }));
                }

                let mut result = Ok(());
                for handle in handles {
                    if let Ok(Err(err)) = handle.await {
                        result = Err(err);
                    }
                }
                result
            }
            #[cfg(unix)]
            BindAddress::Unix(path) => {
                let _ = std::fs::remove_file(path);
                let listener = UnixListener::bind(path)?;
                tracing::info!(path = %path.display(), "listening");

                axum::serve(listener, axum_router)
                    .with_graceful_shutdown(shutdown.cancelled_owned())
                    .await
            }
        };

        for bundle in self.bundles.iter().rev() {
            bundle.deinit(&self.provider);
        }

        result
    }
}

async fn handle_request(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: AxumRequest,
) -> AxumResponse {
    let (parts, body) = request.into_parts();

    let method = match Method::try_from(&parts.method) {
        Ok(method) => method,
        Err(()) => {
            return DispatchError::RouteNotMatched {
                method: parts.method.to_string(),
                path: parts.uri.path().to_owned(),
            }
            .into_response()
            .into_axum();
        }
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return DispatchError::Transport(Box::new(err)).into_response().into_axum();
        }
    };

    let request = Request::new(method, parts.uri, parts.headers, body);
    dispatcher.dispatch(request).into_axum()
}

trait IntoAxumResponse {
    fn into_axum(self) -> AxumResponse;
}

impl IntoAxumResponse for crate::response::Response {
    fn into_axum(self) -> AxumResponse {
        let (status, headers, body) = self.into_parts();
        let mut builder = axum::response::Response::builder().status(status);
        *builder.headers_mut().expect("fresh builder has headers") = headers;
        builder
            .body(Body::from(body))
            .unwrap_or_else(|_| AxumResponse::new(Body::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokamak_inject::{ConstructionError, ConstructionResult};

    struct Recording {
        label: &'static str,
        fail_init: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Bundle for Recording {
        fn init(&self, _provider: &tokamak_inject::ServiceProvider) -> ConstructionResult<()> {
            self.log.lock().unwrap().push(format!("init:{}", self.label));
            if self.fail_init {
                return Err(ConstructionError::Custom(Box::new(std::io::Error::other(
                    "boom",
                ))));
            }
            Ok(())
        }

        fn deinit(&self, _provider: &tokamak_inject::ServiceProvider) {
            self.log.lock().unwrap().push(format!("deinit:{}", self.label));
        }
    }

    #[test]
    fn failed_init_rolls_back_earlier_bundles_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let err = Application::new()
            .bundle(Recording {
                label: "a",
                fail_init: false,
                log: Arc::clone(&log),
            })
            .bundle(Recording {
                label: "b",
                fail_init: true,
                log: Arc::clone(&log),
            })
            .build()
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Init(_)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["init:a", "init:b", "deinit:a"],
        );
    }
}
