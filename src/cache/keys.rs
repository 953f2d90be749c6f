//! Cache key construction.
//!
//! A key is the endpoint (path plus canonical query string) followed by the
//! serialized request options, so two requests share an entry exactly when
//! they would hit the same URL with the same options.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new<O: Serialize>(endpoint: &str, options: &O) -> Self {
        let options = serde_json::to_string(options).unwrap_or_else(|_| "{}".to_string());
        Self(format!("{endpoint}_{options}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
