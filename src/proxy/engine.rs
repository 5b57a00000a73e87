// ────────────────────────────────
// src/proxy/engine.rs
// Forwarding engine: builds the outbound request and relays the backend
// response, either fully buffered or chunk-by-chunk.
// ────────────────────────────────

use super::error::ProxyError;
use futures::StreamExt;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Upper bound for a single outbound call, streaming or not.
pub const FORWARD_TIMEOUT: Duration = Duration::from_secs(300);

// Response headers valid for one connection only. The relayed payload is
// re-framed, so these must not be copied through.
const HOP_BY_HOP_RESPONSE_HEADERS: [&str; 4] = [
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
];

// Request headers the backend must never see: the proxy's own credential
// headers, the inbound host, and framing headers for the rebuilt body.
const STRIPPED_REQUEST_HEADERS: [&str; 6] = [
    "host",
    "authorization",
    "proxy-authorization",
    "content-length",
    "transfer-encoding",
    "connection",
];

/// One fully-read inbound request, ready for dispatch. Constructed per call
/// and discarded once the response has been relayed.
#[derive(Debug)]
pub struct ProxyRequest {
    pub method: Method,
    pub target_url: String,
    pub headers: HeaderMap,
    pub query: Option<String>,
    pub body: Bytes,
    pub instance: String,
}

/// How a backend response travels back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStrategy {
    /// Await the whole response, reinterpret it, send it as one buffer.
    Buffered,
    /// Relay status, headers and body bytes as they arrive.
    Streaming,
}

impl RelayStrategy {
    /// Decide the strategy from the request body: a JSON object carrying a
    /// boolean `stream: true` selects streaming. Parse failures, absent
    /// fields and non-boolean values all mean buffered. The body is
    /// forwarded untouched either way.
    pub fn sniff(body: &[u8]) -> Self {
        if body.is_empty() {
            return RelayStrategy::Buffered;
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(json) if json.get("stream").and_then(Value::as_bool) == Some(true) => {
                RelayStrategy::Streaming
            }
            _ => RelayStrategy::Buffered,
        }
    }
}

/// Inbound headers minus the stripped set.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in inbound {
        if STRIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Dispatches outbound requests and relays responses.
pub struct ForwardingEngine {
    client: reqwest::Client,
}

impl ForwardingEngine {
    /// Build an engine with the given outbound timeout bound.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Dispatch `request` and relay the backend response.
    ///
    /// The relay strategy is sniffed from the request body before dispatch.
    /// Failures that occur before any response bytes reach the caller map
    /// onto the error taxonomy; a failure after a stream has started can
    /// only truncate it.
    pub async fn forward(&self, request: ProxyRequest) -> Result<Response<Body>, ProxyError> {
        let ProxyRequest {
            method,
            target_url,
            headers,
            query,
            body,
            instance,
        } = request;

        let strategy = RelayStrategy::sniff(&body);

        let mut url = Url::parse(&target_url)
            .map_err(|e| ProxyError::Unclassified(format!("invalid target URL: {}", e)))?;
        url.set_query(query.as_deref());

        tracing::info!(
            %method,
            url = %url,
            instance = %instance,
            streaming = matches!(strategy, RelayStrategy::Streaming),
            "proxying request"
        );

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(classify_dispatch_error)?;

        match strategy {
            RelayStrategy::Streaming => self.relay_streaming(response),
            RelayStrategy::Buffered => self.relay_buffered(response).await,
        }
    }

    /// Relay the backend response incrementally: status and headers first,
    /// then each chunk in arrival order with no whole-body buffering. The
    /// reqwest response is owned by the wrapped stream, so dropping the
    /// caller side tears the backend connection down with it.
    fn relay_streaming(&self, upstream: reqwest::Response) -> Result<Response<Body>, ProxyError> {
        let status = upstream.status();
        let headers = relay_headers(upstream.headers());

        tracing::debug!(%status, "streaming response started");

        let stream = upstream.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                // Too late for a clean error response; the relay just ends.
                tracing::warn!(error = %e, "backend stream failed mid-relay");
                e
            })
        });

        let mut response = Response::new(Body::wrap_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        if !response.headers().contains_key(CONTENT_TYPE) {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(response)
    }

    /// Await the whole response, pass JSON through as-is and wrap anything
    /// else in a `raw_response` envelope instead of failing the request.
    async fn relay_buffered(
        &self,
        upstream: reqwest::Response,
    ) -> Result<Response<Body>, ProxyError> {
        let status = upstream.status();
        let headers = relay_headers(upstream.headers());

        let text = upstream.text().await.map_err(classify_dispatch_error)?;

        let payload: Value = if text.is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(&text) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(error = %e, "could not parse backend response as JSON");
                    serde_json::json!({ "raw_response": text })
                }
            }
        };

        tracing::debug!(%status, "buffered response complete");

        let mut response = Response::new(Body::from(payload.to_string()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }
}

/// Backend response headers minus the hop-by-hop set.
fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if HOP_BY_HOP_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Map a dispatch failure onto the taxonomy. Timeouts take precedence: a
/// connect timeout is a timeout, not an unreachable backend.
fn classify_dispatch_error(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        ProxyError::BackendTimeout
    } else if err.is_connect() {
        ProxyError::BackendUnreachable(err.to_string())
    } else {
        ProxyError::Unclassified(err.to_string())
    }
}
