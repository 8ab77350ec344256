//! Route compilation.
//!
//! Endpoints sharing a path template are merged into one `MethodRouter`, so
//! a wrong method on a known path yields 405 rather than 404.

use axum::body::Body;
use axum::http::Request;
use axum::routing::MethodRouter;
use axum::Router;
use std::collections::BTreeMap;

use crate::http::instrument::{wrap, AdapterLimits};
use crate::routing::endpoint::Endpoint;

pub fn build_router(endpoints: Vec<Endpoint>, limits: AdapterLimits) -> Router {
    let mut by_path: BTreeMap<&'static str, MethodRouter> = BTreeMap::new();

    for endpoint in endpoints {
        let Endpoint {
            name,
            method,
            path,
            handler,
        } = endpoint;

        let route = by_path.remove(path).unwrap_or_default();
        let route = route.on(method.filter(), move |request: Request<Body>| {
            wrap(name, handler.clone(), limits, request)
        });
        by_path.insert(path, route);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |router, (path, route)| router.route(path, route))
}
