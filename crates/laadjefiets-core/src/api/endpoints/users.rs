use std::time::Duration;

use serde_json::json;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{Ack, User, UserList, UserUpdate};

pub const USERS_CACHE_KEY: &str = "users";
pub const USERS_DETAILS_CACHE_KEY: &str = "users_with_details";

pub const USERS_TTL: Duration = Duration::from_secs(30);

/// Admin management of all accounts.
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> ApiResult<Vec<User>> {
        let list: UserList = self
            .client
            .cached(USERS_CACHE_KEY, USERS_TTL, "/users", RequestOptions::get())
            .await?;
        Ok(list.into_vec())
    }

    pub async fn get_all_with_details(&self) -> ApiResult<Vec<User>> {
        let options = RequestOptions::post().json(&json!({ "include_details": true }))?;
        let list: UserList = self
            .client
            .cached(USERS_DETAILS_CACHE_KEY, USERS_TTL, "/users", options)
            .await?;
        Ok(list.into_vec())
    }

    pub async fn update(&self, user_id: i64, update: &UserUpdate) -> ApiResult<Ack> {
        let options = RequestOptions::put().json(update)?;
        let value = self
            .client
            .request(&format!("/users/{}", user_id), options)
            .await?;
        self.invalidate();
        Ok(Ack::from_value(value))
    }

    pub async fn delete(&self, user_id: i64) -> ApiResult<Ack> {
        let value = self
            .client
            .request(&format!("/users/{}", user_id), RequestOptions::delete())
            .await?;
        self.invalidate();
        Ok(Ack::from_value(value))
    }

    fn invalidate(&self) {
        self.client.cache().clear(USERS_CACHE_KEY);
        self.client.cache().clear(USERS_DETAILS_CACHE_KEY);
    }
}
