use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{AdminCheck, Credentials, LoginResponse, Registration, User};

pub const USER_CACHE_KEY: &str = "user";

/// Profile cache lifetime.
pub const USER_TTL: Duration = Duration::from_secs(30);

/// The signed-in account: profile, login/logout, registration, deletion.
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Profile of the token holder, cached for 30 seconds.
    pub async fn get(&self) -> ApiResult<User> {
        self.client
            .cached(USER_CACHE_KEY, USER_TTL, "/user", RequestOptions::get())
            .await
    }

    /// Log in and persist the returned token.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let options = RequestOptions::post().json(credentials)?;
        let response: LoginResponse = self.client.request_json("/login", options).await?;

        self.client.store_token(&response.token)?;
        // Another account may have been cached before this login
        self.client.cache().clear_all();

        info!(username = %credentials.username, "Login successful");
        Ok(response)
    }

    pub async fn register(&self, registration: &Registration) -> ApiResult<Value> {
        let options = RequestOptions::post().json(registration)?;
        let response = self.client.request("/register", options).await?;
        info!(email = %registration.email, "Registration accepted");
        Ok(response)
    }

    /// Delete the account, then drop the token and every cached payload.
    pub async fn delete(&self) -> ApiResult<()> {
        self.client
            .request("/user/delete", RequestOptions::delete())
            .await?;
        self.client.clear_token()?;
        self.client.cache().clear_all();
        info!("Account deleted");
        Ok(())
    }

    /// End the session. Local state is cleared even if the backend call fails.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.client.request("/logout", RequestOptions::post()).await;
        if let Err(ref e) = result {
            warn!(error = %e, "Logout request failed; clearing local session anyway");
        }

        self.client.clear_token()?;
        self.client.cache().clear_all();
        result.map(|_| ())
    }

    /// Whether `user_id` holds the Admin role.
    pub async fn is_admin(&self, user_id: i64) -> ApiResult<bool> {
        let check: AdminCheck = self
            .client
            .request_json(&format!("/isuseradmin/{}", user_id), RequestOptions::post())
            .await?;
        Ok(check.role.is_admin())
    }
}
