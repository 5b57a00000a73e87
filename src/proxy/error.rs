// ────────────────────────────────
// src/proxy/error.rs
// Error taxonomy for request handling, mapped onto caller-facing responses.
// ────────────────────────────────

use crate::auth::AuthError;
use hyper::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::{Body, Response, StatusCode};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection-level failure toward the backend (refused, DNS, ...).
    #[error("Cannot connect to Ollama backend: {0}")]
    BackendUnreachable(String),

    /// The outbound bound elapsed before the backend finished responding.
    #[error("Ollama backend timeout")]
    BackendTimeout,

    /// Anything else that went wrong while dispatching.
    #[error("Proxy error: {0}")]
    Unclassified(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Auth(AuthError::MissingToken) => StatusCode::UNAUTHORIZED,
            ProxyError::Auth(AuthError::InvalidToken) => StatusCode::FORBIDDEN,
            ProxyError::BackendUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Every error path becomes a structured JSON body with a `detail` message.
impl From<ProxyError> for Response<Body> {
    fn from(err: ProxyError) -> Self {
        let status = err.status();
        let body = json!({ "detail": err.to_string() });

        let mut builder = Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json");

        // 401 advertises the expected credential scheme.
        if status == StatusCode::UNAUTHORIZED {
            builder = builder.header(WWW_AUTHENTICATE, "Bearer");
        }

        builder.body(Body::from(body.to_string())).unwrap()
    }
}
