//! Endpoint facades, one per resource group.
//!
//! Each facade borrows the `ApiClient`, checks the cache under a fixed key,
//! falls back to `request`, and clears related keys after a mutation.

pub mod credits;
pub mod locations;
pub mod sessions;
pub mod sockets;
pub mod status;
pub mod user;
pub mod users;

pub use credits::CreditsApi;
pub use locations::LocationsApi;
pub use sessions::SessionsApi;
pub use sockets::{SocketsApi, SOCKETS_CACHE_KEY, SOCKETS_TTL};
pub use status::{status_cache_key, StatusApi, STATUS_TTL};
pub use user::{UserApi, USER_CACHE_KEY, USER_TTL};
pub use users::{UsersApi, USERS_CACHE_KEY, USERS_DETAILS_CACHE_KEY, USERS_TTL};
