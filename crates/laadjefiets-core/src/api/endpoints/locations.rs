use tracing::info;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::error::ApiResult;
use crate::models::{Ack, Location, LocationEnvelope, LocationList, NewLocation, Socket, SocketList};

/// Charging sites and the sockets assigned to them. Nothing here is cached.
pub struct LocationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LocationsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn for_user(&self, user_id: i64) -> ApiResult<Vec<Location>> {
        let list: LocationList = self
            .client
            .request_json(&format!("/locations/user/{}", user_id), RequestOptions::get())
            .await?;
        Ok(list.into_vec())
    }

    pub async fn get(&self, location_id: i64) -> ApiResult<Location> {
        let location: LocationEnvelope = self
            .client
            .request_json(&format!("/locations/{}", location_id), RequestOptions::get())
            .await?;
        Ok(location.into_inner())
    }

    pub async fn sockets(&self, location_id: i64) -> ApiResult<Vec<Socket>> {
        let list: SocketList = self
            .client
            .request_json(
                &format!("/locations/{}/sockets", location_id),
                RequestOptions::get(),
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn create(&self, location: &NewLocation) -> ApiResult<Location> {
        let options = RequestOptions::post().json(location)?;
        let created: LocationEnvelope = self.client.request_json("/locations", options).await?;
        let created = created.into_inner();
        info!(id = created.id, name = %created.name, "Location created");
        Ok(created)
    }

    pub async fn delete(&self, location_id: i64) -> ApiResult<Ack> {
        let value = self
            .client
            .request(&format!("/locations/{}", location_id), RequestOptions::delete())
            .await?;
        info!(id = location_id, "Location deleted");
        Ok(Ack::from_value(value))
    }
}
