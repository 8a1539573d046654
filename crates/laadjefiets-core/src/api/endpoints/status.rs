use std::time::Duration;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::HealthReport;

/// Health result cache lifetime.
pub const STATUS_TTL: Duration = Duration::from_secs(25);

pub fn status_cache_key(service: &str) -> String {
    format!("status_{}", service)
}

/// Backend health endpoints.
pub struct StatusApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StatusApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn check(&self, service: &str) -> ApiResult<HealthReport> {
        self.client
            .cached(
                &status_cache_key(service),
                STATUS_TTL,
                &format!("/health/{}", service),
                RequestOptions::get(),
            )
            .await
    }

    /// Skip the cache and ask the backend again.
    pub async fn refresh(&self, service: &str) -> ApiResult<HealthReport> {
        self.client.cache().clear(&status_cache_key(service));
        self.check(service).await
    }
}
