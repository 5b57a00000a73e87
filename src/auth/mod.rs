// src/auth/mod.rs
mod token;

pub use token::{fingerprint, AuthError, Authenticator};
