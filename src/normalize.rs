//! Address normalization for cache keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefix for logged keys
const KEY_NAMESPACE: &str = "weather_forecast";

/// Cache-safe token derived from a free-text address.
///
/// Only ever contains `[a-z0-9_]`. Distinct addresses may map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key with the `weather_forecast:` namespace, as logged
    #[must_use]
    pub fn namespaced(&self) -> String {
        format!("{KEY_NAMESPACE}:{}", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Space, tab, LF, vertical tab, form feed, CR
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Normalize an address into a [`CacheKey`].
///
/// Trim, lowercase, collapse each whitespace run into one `_`, then drop
/// every character outside `[a-z0-9_]`. Collapsing runs before stripping
/// means `"Los Angeles - CA"` becomes `"los_angeles__ca"`; keys already in
/// use depend on that double underscore.
#[must_use]
pub fn normalize(address: &str) -> CacheKey {
    let lowered = address.trim_matches(is_separator).to_lowercase();

    let mut collapsed = String::with_capacity(lowered.len());
    let mut in_run = false;
    for c in lowered.chars() {
        if is_separator(c) {
            if !in_run {
                collapsed.push('_');
                in_run = true;
            }
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }

    collapsed.retain(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    CacheKey(collapsed)
}
