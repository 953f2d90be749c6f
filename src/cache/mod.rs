//! Response caching for WordPress reads.
//!
//! - [`ResponseCache`]: TTL + LRU store of decoded responses
//! - [`InFlight`]: collapses concurrent identical requests into one
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! ttl_seconds = 60
//! capacity = 256
//! ```

mod config;
mod inflight;
mod keys;
mod store;

pub use config::CacheConfig;
pub use inflight::{InFlight, SharedFetch};
pub use keys::CacheKey;
pub use store::{CachedResponse, ResponseCache};

pub(crate) use inflight::METRIC_INFLIGHT_JOIN;
pub(crate) use store::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS};
