//! REST API client module for the Laadjefiets backend.
//!
//! This module provides the `ApiClient` for talking to the charging-socket
//! API, plus the endpoint facades built on top of it.
//!
//! The API uses bearer token authentication; the token is issued by
//! `POST /login` and read from the configured `TokenStore` on every request.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{decode, merge_headers, ApiClient, RequestOptions};
pub use error::{ApiError, ApiResult};
pub use reqwest::StatusCode;
