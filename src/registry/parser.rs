// src/registry/parser.rs

/// Outcome of parsing an instance specification string.
///
/// Parsing is deliberately permissive: tokens that do not match either
/// accepted shape are collected in `skipped` instead of failing the whole
/// configuration. The caller decides what to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstances {
    /// `(name, base_url)` pairs in configuration order, duplicates included.
    pub entries: Vec<(String, String)>,
    /// Tokens with the wrong shape.
    pub skipped: Vec<String>,
}

/// Parse a comma-separated instance list.
///
/// Accepted entries are `name:host:port` and `name:port`; the two-part form
/// implies `localhost`. Anything with another part count is skipped. The
/// host and port are taken verbatim, there is no further validation.
pub fn parse_instances(spec: &str) -> ParsedInstances {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let parts: Vec<&str> = token.split(':').collect();
        match parts.as_slice() {
            [name, host, port] => {
                entries.push((name.to_string(), format!("http://{}:{}", host, port)));
            }
            [name, port] => {
                entries.push((name.to_string(), format!("http://localhost:{}", port)));
            }
            _ => skipped.push(token.to_string()),
        }
    }

    ParsedInstances { entries, skipped }
}
