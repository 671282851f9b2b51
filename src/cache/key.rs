//! Cache Key Module
//!
//! Derives the storage name of an entry from the request it answers.

use std::fmt;

// == Cache Key ==
/// Canonical, filesystem-safe key for one transformation request.
///
/// Built from the raw request path, the query string in arrival order and the
/// cache format version, then percent-encoded so it can be used as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    // == Constructor ==
    /// Creates a key from request parts.
    ///
    /// An empty or missing query contributes nothing; a non-empty one is
    /// prefixed with `?`.
    pub fn new(path: &str, query: Option<&str>, version: &str) -> Self {
        let mut raw = String::with_capacity(path.len() + version.len() + 16);
        raw.push_str(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }
        raw.push_str(version);

        Self(encode_component(&raw))
    }

    /// Returns the encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-encodes everything outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
fn encode_component(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(input.len() * 3);
    for &byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
        }
    }
    out
}
