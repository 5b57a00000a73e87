// src/router/mod.rs
use crate::registry::BackendRegistry;
use std::sync::Arc;

/// Where an inbound path leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Bare root path, answered locally with service metadata.
    ServiceInfo,
    /// Top-level `health` path, answered locally with a liveness indicator.
    Health,
    /// Everything else is forwarded to a backend.
    Forward {
        base_url: String,
        forward_path: String,
        instance: String,
    },
}

/// Decides which backend an inbound path addresses and what path to
/// forward there.
#[derive(Clone)]
pub struct RouteResolver {
    registry: Arc<BackendRegistry>,
}

impl RouteResolver {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// Resolution policy:
    /// 1. A first segment naming a configured instance routes there with
    ///    the prefix stripped. `/a/health` is a backend request, not a
    ///    health check.
    /// 2. The bare root and the literal top-level `health` path are
    ///    answered locally.
    /// 3. Any other path goes to the default backend in full - the first
    ///    segment is kept, since it never was an instance selector.
    pub fn resolve(&self, path: &str) -> Route {
        let path = path.trim_start_matches('/');

        let (first, rest) = match path.split_once('/') {
            Some((first, rest)) => (first, rest),
            None => (path, ""),
        };

        if !first.is_empty() && self.registry.contains(first) {
            return Route::Forward {
                base_url: self.registry.resolve(Some(first)).to_string(),
                forward_path: rest.to_string(),
                instance: first.to_string(),
            };
        }

        match path {
            "" => Route::ServiceInfo,
            "health" => Route::Health,
            _ => Route::Forward {
                base_url: self.registry.default_url().to_string(),
                forward_path: path.to_string(),
                instance: "default".to_string(),
            },
        }
    }
}
