use tracing::info;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{CreditBalance, TopUp};

pub struct CreditsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CreditsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn balance(&self) -> ApiResult<CreditBalance> {
        self.client
            .request_json("/credits/balance", RequestOptions::get())
            .await
    }

    /// Top up by `amount` euros and return the refreshed balance.
    pub async fn add(&self, amount: u32) -> ApiResult<CreditBalance> {
        let options = RequestOptions::post().json(&TopUp { amount })?;
        self.client
            .request(&format!("/credits/balance/add?amount={}", amount), options)
            .await?;
        info!(amount, "Credits added");
        self.balance().await
    }
}
