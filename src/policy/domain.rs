//! Domain Allowlist Module
//!
//! Matches source hostnames against the configured domain patterns.

// == Domain Policy ==
/// Allowlist of source domains.
///
/// Patterns are case-folded on construction:
/// - `*` matches every host
/// - `*.example.com` matches `example.com` and any subdomain of it
/// - anything else must match the host exactly
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    patterns: Vec<String>,
}

impl DomainPolicy {
    // == Constructor ==
    /// Creates a policy from raw patterns, trimming and dropping blanks.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self { patterns }
    }

    // == Allows ==
    /// Returns true if `host` matches at least one pattern.
    pub fn allows(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.patterns.iter().any(|p| pattern_matches(p, &host))
    }
}

/// `host` is expected to be lowercase already.
fn pattern_matches(pattern: &str, host: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => pattern == host,
    }
}
