//
// src/proxy/mod.rs
//
mod engine;
mod error;
mod proxy;

pub use engine::{outbound_headers, ForwardingEngine, ProxyRequest, RelayStrategy, FORWARD_TIMEOUT};
pub use error::ProxyError;
pub use proxy::Proxy;
