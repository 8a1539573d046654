use std::time::Duration;

use serde_json::json;
use tracing::info;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{Ack, NewSocket, Socket, SocketList, SocketOwner, SocketOwnerList};

pub const SOCKETS_CACHE_KEY: &str = "sockets";

/// Socket list cache lifetime; short because session state changes often.
pub const SOCKETS_TTL: Duration = Duration::from_secs(15);

pub struct SocketsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SocketsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sockets owned by the signed-in user.
    pub async fn get_all(&self) -> ApiResult<Vec<Socket>> {
        let options = RequestOptions::post().json(&json!({}))?;
        let list: SocketList = self
            .client
            .cached(SOCKETS_CACHE_KEY, SOCKETS_TTL, "/sockets", options)
            .await?;
        Ok(list.into_vec())
    }

    /// Every socket in the network (admin view). Not cached.
    pub async fn get_all_admin(&self) -> ApiResult<Vec<Socket>> {
        let list: SocketList = self
            .client
            .request_json("/allsockets", RequestOptions::post())
            .await?;
        Ok(list.into_vec())
    }

    pub async fn create(&self, socket: &NewSocket) -> ApiResult<Ack> {
        let options = RequestOptions::post().json(socket)?;
        let value = self.client.request("/socket/new", options).await?;
        self.client.cache().clear(SOCKETS_CACHE_KEY);
        info!(socket_id = %socket.socket_id, "Socket created");
        Ok(Ack::from_value(value))
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .request(&format!("/socket/delete/{}", id), RequestOptions::delete())
            .await?;
        self.client.cache().clear(SOCKETS_CACHE_KEY);
        info!(id, "Socket deleted");
        Ok(())
    }

    pub async fn delete_all(&self) -> ApiResult<()> {
        self.client
            .request("/sockets/delete-all", RequestOptions::delete())
            .await?;
        self.client.cache().clear(SOCKETS_CACHE_KEY);
        info!("All sockets deleted");
        Ok(())
    }

    /// Customer a socket belongs to.
    pub async fn owner(&self, socket_id: &str) -> ApiResult<SocketOwner> {
        self.client
            .request_json(&format!("/socketbelongsto/{}", socket_id), RequestOptions::get())
            .await
    }

    /// Owners for several sockets in one round trip.
    pub async fn owners(&self, socket_ids: &[String]) -> ApiResult<Vec<SocketOwner>> {
        let options = RequestOptions::post().json(&json!({ "socket_ids": socket_ids }))?;
        let list: SocketOwnerList = self
            .client
            .request_json("/socketbelongsto/bulk", options)
            .await?;
        Ok(list.into_vec())
    }
}
