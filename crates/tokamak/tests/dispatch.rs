/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! End-to-end exercise of the HTTP dispatcher: routing, dependency injection, request-scoped
//! `provide`, and the error funnel, all without touching the network.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use tokamak::{
    Context, Dep, Dispatcher, Extension, Json, Method, Path, Request, Router, ServiceCollection,
    get, group, post, provide,
};
use tokamak_inject::injectable;

fn request(method: Method, path: &str, body: &[u8]) -> Request {
    Request::new(method, path.parse().unwrap(), HeaderMap::new(), Bytes::copy_from_slice(body))
}

#[derive(Clone)]
struct Greeting(String);

#[injectable]
impl Greeting {
    pub fn new() -> Self {
        Self("hello".to_owned())
    }
}

fn greet(Dep(greeting): Dep<Greeting>, Path(name): Path<String>) -> String {
    format!("{}, {name}", greeting.0)
}

#[derive(serde::Deserialize, serde::Serialize)]
struct Echo {
    value: u32,
}

fn echo(Json(body): Json<Echo>) -> Json<Echo> {
    Json(body)
}

#[test]
fn resolves_injected_service_and_path_param_together() {
    let router = Router::new()
        .route(get("/hello/:name", greet))
        .unwrap();
    let provider = ServiceCollection::new().add_singleton::<Greeting>().build();
    let dispatcher = Dispatcher::new(router, provider, Vec::new(), None);

    let response = dispatcher.dispatch(request(Method::Get, "/hello/eve", b""));
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.into_parts().2.as_ref(), b"hello, eve");
}

#[test]
fn json_body_round_trips_through_extractor_and_into_response() {
    let router = Router::new().route(post("/echo", echo)).unwrap();
    let provider = ServiceCollection::new().build();
    let dispatcher = Dispatcher::new(router, provider, Vec::new(), None);

    let response = dispatcher.dispatch(request(Method::Post, "/echo", br#"{"value": 7}"#));
    assert_eq!(response.status_code(), StatusCode::OK);
    let (_, _, body) = response.into_parts();
    let echoed: Echo = serde_json::from_slice(&body).unwrap();
    assert_eq!(echoed.value, 7);
}

#[test]
fn unmatched_route_funnels_through_as_404() {
    let router = Router::new();
    let provider = ServiceCollection::new().build();
    let dispatcher = Dispatcher::new(router, provider, Vec::new(), None);

    let response = dispatcher.dispatch(request(Method::Get, "/nowhere", b""));
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[test]
fn malformed_json_body_funnels_through_as_400() {
    let router = Router::new().route(post("/echo", echo)).unwrap();
    let provider = ServiceCollection::new().build();
    let dispatcher = Dispatcher::new(router, provider, Vec::new(), None);

    let response = dispatcher.dispatch(request(Method::Post, "/echo", b"not json"));
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

fn whoami(Extension(caller): Extension<&'static str>) -> String {
    caller.to_owned()
}

#[test]
fn group_and_provide_compose_path_prefix_and_request_scoped_values() {
    let routes = group(
        "/api",
        provide(|_ctx: &Context<'_>| Ok("eve"), vec![get("/whoami", whoami)]),
    );
    let mut router = Router::new();
    for route in routes {
        router = router.route(route).unwrap();
    }
    let provider = ServiceCollection::new().build();
    let dispatcher = Dispatcher::new(router, provider, Vec::new(), None);

    let response = dispatcher.dispatch(request(Method::Get, "/api/whoami", b""));
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.into_parts().2.as_ref(), b"eve");
}
