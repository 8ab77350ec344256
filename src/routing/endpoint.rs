//! The endpoint table.

use axum::routing::MethodFilter;
use std::fmt;
use std::sync::Arc;

use crate::http::adapter::HandlerFn;
use crate::http::handlers;
use crate::store::DefinitionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Delete => MethodFilter::DELETE,
        }
    }
}

/// One API operation: its name (used in spans, logs and metrics labels),
/// HTTP method, path template and handler.
#[derive(Clone)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub handler: HandlerFn,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The four definition endpoints, backed by `store`.
pub fn definition_endpoints(store: Arc<dyn DefinitionStore>) -> Vec<Endpoint> {
    vec![
        Endpoint {
            name: "get_definition",
            method: HttpMethod::Get,
            path: "/dv/{config_hash}",
            handler: handlers::get_definition(store.clone()),
        },
        Endpoint {
            name: "delete_definition",
            method: HttpMethod::Delete,
            path: "/dv/{config_hash}",
            handler: handlers::delete_definition(store.clone()),
        },
        Endpoint {
            name: "create_definition",
            method: HttpMethod::Post,
            path: "/dv",
            handler: handlers::create_definition(store.clone()),
        },
        Endpoint {
            name: "add_operator",
            method: HttpMethod::Put,
            path: "/dv/{config_hash}",
            handler: handlers::add_operator(store),
        },
    ]
}
