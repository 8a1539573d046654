//! In-memory response caching and request debouncing.
//!
//! Both stores are owned by an `ApiClient` instance rather than held as
//! process-wide state, so every client (and every test) gets its own.
//!
//! - `TtlCache`: JSON payloads keyed by resource name, each with its own TTL
//! - `Debouncer`: trailing-edge collapse of repeated calls per key

pub mod debounce;
pub mod store;

pub use debounce::{Debouncer, DEBOUNCE_DELAY};
pub use store::{CacheEntry, TtlCache, DEFAULT_TTL};
