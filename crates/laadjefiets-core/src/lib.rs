//! Core library for the Laadjefiets console.
//!
//! - `api`: HTTP client, endpoint facades and errors
//! - `cache`: per-client TTL cache and debouncer
//! - `auth`: bearer token storage
//! - `models`: typed API records
//! - `status`: service health board
//! - `tasks`: owner-scoped background tasks
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod status;
pub mod tasks;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult};
pub use config::Config;
