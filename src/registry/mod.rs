// src/registry/mod.rs
mod parser;

pub use parser::{parse_instances, ParsedInstances};

use std::collections::HashMap;

/// Substituted when configuration yields no usable entries.
pub const FALLBACK_NAME: &str = "default";
pub const FALLBACK_URL: &str = "http://localhost:11434";

/// Immutable `name -> base URL` mapping, built once at startup and shared
/// read-only across all requests.
///
/// The first configured name is the default backend; lookups for unknown or
/// absent names fall back to it. The registry is never empty.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    urls: HashMap<String, String>,
    // Names in configuration order. A duplicate name keeps its first
    // position while its URL is overwritten (last write wins).
    order: Vec<String>,
}

impl BackendRegistry {
    pub fn new(parsed: &ParsedInstances) -> Self {
        let mut urls = HashMap::new();
        let mut order = Vec::new();

        for (name, url) in &parsed.entries {
            if !urls.contains_key(name) {
                order.push(name.clone());
            }
            urls.insert(name.clone(), url.clone());
        }

        if order.is_empty() {
            order.push(FALLBACK_NAME.to_string());
            urls.insert(FALLBACK_NAME.to_string(), FALLBACK_URL.to_string());
        }

        Self { urls, order }
    }

    /// Base URL for `name`, or the default backend when the name is unknown
    /// or absent.
    pub fn resolve(&self, name: Option<&str>) -> &str {
        name.and_then(|n| self.urls.get(n))
            .map(String::as_str)
            .unwrap_or_else(|| self.default_url())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.urls.contains_key(name)
    }

    /// The first configured backend's URL. `order` is non-empty by
    /// construction.
    pub fn default_url(&self) -> &str {
        &self.urls[&self.order[0]]
    }

    /// Instance names in configuration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }
}
