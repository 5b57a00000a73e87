// src/auth/token.rs
use thiserror::Error;

/// Authorization failures. Always surfaced to the caller, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,
}

/// Validates inbound bearer tokens against the configured shared secret.
///
/// With no secret configured every request is allowed. That insecure dev
/// mode is made observable at startup (warning log) and on the service-info
/// endpoint.
#[derive(Debug, Clone)]
pub struct Authenticator {
    token: Option<String>,
}

impl Authenticator {
    pub fn new(token: Option<String>) -> Self {
        // An empty secret behaves like no secret at all.
        let token = token.filter(|t| !t.is_empty());
        Self { token }
    }

    pub fn enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check an `Authorization` header value. The `Bearer ` prefix is
    /// optional; comparison is byte-for-byte after trimming whitespace.
    pub fn authorize(&self, header: Option<&str>) -> Result<(), AuthError> {
        let expected = match &self.token {
            Some(token) => token,
            None => {
                tracing::debug!("no API token configured - allowing request");
                return Ok(());
            }
        };

        let header = header.ok_or(AuthError::MissingToken)?;
        let presented = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        tracing::debug!(token = %fingerprint(presented), "validating token");

        if presented != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(())
    }
}

/// Loggable shape of a credential: first and last four characters, never
/// the full value. Short tokens are fully masked.
pub fn fingerprint(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}
