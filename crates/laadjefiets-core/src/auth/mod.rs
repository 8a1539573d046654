//! Bearer token storage.
//!
//! This module provides:
//! - `TokenStore`: the storage seam the API client reads on every request
//! - `FileTokenStore`: JSON session file in the data directory
//! - `KeyringTokenStore`: OS-level credential storage via keyring
//! - `MemoryTokenStore`: process-local store, mostly for tests
//!
//! Tokens never expire client-side; a rejected token surfaces as a 401 from
//! the next request.

pub mod credentials;
pub mod session;

pub use credentials::KeyringTokenStore;
pub use session::{FileTokenStore, MemoryTokenStore, SessionData, TokenStore};
