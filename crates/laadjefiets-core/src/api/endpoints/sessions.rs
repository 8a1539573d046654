use tracing::info;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{Ack, SessionCommand, SessionInfo};

use super::sockets::SOCKETS_CACHE_KEY;

/// Remote start/stop of charging sessions.
pub struct SessionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SessionsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn start(&self, user_id: i64, socket_id: &str) -> ApiResult<Ack> {
        self.command("start", user_id, socket_id).await
    }

    pub async fn stop(&self, user_id: i64, socket_id: &str) -> ApiResult<Ack> {
        self.command("stop", user_id, socket_id).await
    }

    async fn command(&self, action: &str, user_id: i64, socket_id: &str) -> ApiResult<Ack> {
        let endpoint = format!("/{}/socket/{}/{}", user_id, action, socket_id);
        let options = RequestOptions::post().json(&SessionCommand { socket_id })?;
        let value = self.client.request(&endpoint, options).await?;
        // Socket status is part of the list payload
        self.client.cache().clear(SOCKETS_CACHE_KEY);
        info!(user_id, socket_id, action, "Session command accepted");
        Ok(Ack::from_value(value))
    }

    /// Session history for a socket, newest first.
    pub async fn info(&self, socket_id: &str) -> ApiResult<SessionInfo> {
        let value = self
            .client
            .request(&format!("/getsessioninfo/{}", socket_id), RequestOptions::get())
            .await?;
        if value.is_null() {
            return Ok(SessionInfo::default());
        }
        crate::api::client::decode("/getsessioninfo", &value)
    }
}
