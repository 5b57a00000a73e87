// ────────────────────────────────
// src/proxy/proxy.rs
// Per-request orchestration: route, authenticate, forward, relay.
// ────────────────────────────────

use crate::auth::{AuthError, Authenticator};
use crate::metrics::MetricsCollector;
use crate::proxy::engine::{outbound_headers, ForwardingEngine, ProxyRequest, FORWARD_TIMEOUT};
use crate::proxy::error::ProxyError;
use crate::registry::BackendRegistry;
use crate::router::{Route, RouteResolver};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

pub struct Proxy {
    registry: Arc<BackendRegistry>,
    resolver: RouteResolver,
    authenticator: Authenticator,
    engine: ForwardingEngine,
    metrics: Arc<MetricsCollector>,
}

impl Proxy {
    pub fn new(
        registry: Arc<BackendRegistry>,
        authenticator: Authenticator,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            resolver: RouteResolver::new(registry.clone()),
            registry,
            authenticator,
            engine: ForwardingEngine::new(FORWARD_TIMEOUT),
            metrics,
        }
    }

    /// Replace the engine with one using a shorter outbound bound. Used by
    /// tests that exercise the timeout path.
    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.engine = ForwardingEngine::new(timeout);
        self
    }

    /// Handle one inbound request. Never fails: every error is converted
    /// into a clean JSON error response before any bytes have been sent.
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "request",
            id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        async move {
            let start = Instant::now();
            self.metrics.increment_active_requests();

            let method = req.method().clone();
            let route = self.resolver.resolve(req.uri().path());
            let instance = match &route {
                Route::Forward { instance, .. } => instance.clone(),
                _ => "local".to_string(),
            };

            let response = match self.dispatch(route, req).await {
                Ok(response) => response,
                Err(err) => {
                    if let ProxyError::Auth(reason) = &err {
                        self.metrics.record_auth_failure(match reason {
                            AuthError::MissingToken => "missing",
                            AuthError::InvalidToken => "invalid",
                        });
                        tracing::warn!(%reason, "request rejected");
                    } else {
                        tracing::error!(error = %err, "request failed");
                    }
                    err.into()
                }
            };

            self.metrics.record_request(
                method.as_str(),
                response.status().as_u16(),
                &instance,
                start.elapsed(),
            );
            self.metrics.decrement_active_requests();

            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        route: Route,
        req: Request<Body>,
    ) -> Result<Response<Body>, ProxyError> {
        match route {
            // The two local endpoints bypass authentication and never
            // contact a backend.
            Route::ServiceInfo => Ok(self.service_info()),
            Route::Health => Ok(health_response()),
            Route::Forward {
                base_url,
                forward_path,
                instance,
            } => {
                let auth_header = req
                    .headers()
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok());
                self.authenticator.authorize(auth_header)?;

                let proxy_request =
                    build_proxy_request(req, &base_url, &forward_path, instance).await?;
                self.engine.forward(proxy_request).await
            }
        }
    }

    fn service_info(&self) -> Response<Body> {
        let payload = json!({
            "service": "Ollama Proxy",
            "status": "running",
            "backends": self.registry.names(),
            "authentication": if self.authenticator.enabled() { "enabled" } else { "disabled" },
        });
        json_response(StatusCode::OK, payload)
    }
}

/// Read the inbound body fully and assemble the outbound request parts.
async fn build_proxy_request(
    req: Request<Body>,
    base_url: &str,
    forward_path: &str,
    instance: String,
) -> Result<ProxyRequest, ProxyError> {
    let method = req.method().clone();
    let query = req.uri().query().map(str::to_owned);
    let headers = outbound_headers(req.headers());

    // Hard bound: the whole request body is buffered before forwarding.
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|e| ProxyError::Unclassified(format!("failed to read request body: {}", e)))?;

    Ok(ProxyRequest {
        method,
        target_url: format!("{}/{}", base_url.trim_end_matches('/'), forward_path),
        headers,
        query,
        body,
        instance,
    })
}

fn health_response() -> Response<Body> {
    json_response(StatusCode::OK, json!({ "status": "healthy" }))
}

fn json_response(status: StatusCode, payload: serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}
