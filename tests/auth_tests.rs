// tests/auth_tests.rs
use ollama_proxy::auth::{fingerprint, AuthError, Authenticator};

#[test]
fn no_token_allows_everything() {
    let auth = Authenticator::new(None);

    assert!(!auth.enabled());
    assert!(auth.authorize(None).is_ok());
    assert!(auth.authorize(Some("anything at all")).is_ok());
}

#[test]
fn empty_token_means_disabled() {
    let auth = Authenticator::new(Some(String::new()));

    assert!(!auth.enabled());
    assert!(auth.authorize(None).is_ok());
}

#[test]
fn bare_token_matches() {
    let auth = Authenticator::new(Some("secret123".to_string()));

    assert!(auth.enabled());
    assert!(auth.authorize(Some("secret123")).is_ok());
}

#[test]
fn bearer_prefixed_token_matches() {
    let auth = Authenticator::new(Some("secret123".to_string()));

    assert!(auth.authorize(Some("Bearer secret123")).is_ok());
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let auth = Authenticator::new(Some("secret123".to_string()));

    assert!(auth.authorize(Some("Bearer secret123 ")).is_ok());
    assert!(auth.authorize(Some(" secret123 ")).is_ok());
}

#[test]
fn missing_header_is_distinct_from_wrong_token() {
    let auth = Authenticator::new(Some("secret123".to_string()));

    assert_eq!(auth.authorize(None), Err(AuthError::MissingToken));
    assert_eq!(
        auth.authorize(Some("Bearer wrong")),
        Err(AuthError::InvalidToken)
    );
}

#[test]
fn token_comparison_is_exact() {
    let auth = Authenticator::new(Some("secret123".to_string()));

    assert_eq!(
        auth.authorize(Some("secret1234")),
        Err(AuthError::InvalidToken)
    );
    assert_eq!(
        auth.authorize(Some("Secret123")),
        Err(AuthError::InvalidToken)
    );
}

#[test]
fn fingerprint_never_reveals_short_tokens() {
    assert_eq!(fingerprint("short"), "***");
    assert_eq!(fingerprint(""), "***");
}

#[test]
fn fingerprint_shows_only_the_edges() {
    assert_eq!(fingerprint("secret123"), "secr...t123");
    assert!(!fingerprint("supersecretvalue").contains("secretval"));
}
