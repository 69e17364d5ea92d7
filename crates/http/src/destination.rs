use async_trait::async_trait;
use clientsync_core::config::EndpointConfig;
use clientsync_core::{
    Customer, CustomerPayload, DestinationDirectory, IdPolicy, RecordId, SyncCall, SyncError,
};
use reqwest::{Method, Url};

use crate::endpoint::{Endpoint, HttpSetupError};

const CLIENT_PATH: &str = "/api/v3/client";

/// Client-management store reached through `/api/v3/client`.
pub struct HttpDestinationDirectory {
    endpoint: Endpoint,
}

impl HttpDestinationDirectory {
    pub fn new(config: &EndpointConfig) -> Result<Self, HttpSetupError> {
        Ok(Self { endpoint: Endpoint::from_config("destination", config)? })
    }

    fn client_url(&self, id: &RecordId) -> Result<Url, SyncError> {
        let call = SyncCall::UpdateDestination;
        let mut url = self.endpoint.url(call, CLIENT_PATH)?;
        url.path_segments_mut()
            .map_err(|_| SyncError::Connection {
                call,
                message: format!("`{CLIENT_PATH}` cannot carry a record id"),
            })?
            .push(&id.as_path_segment());
        Ok(url)
    }
}

#[async_trait]
impl DestinationDirectory for HttpDestinationDirectory {
    async fn find_existing(&self, name: &str) -> Result<Vec<Customer>, SyncError> {
        let call = SyncCall::FindDestination;
        let url = self.endpoint.url(call, CLIENT_PATH)?;
        let request = self.endpoint.request(Method::GET, url).query(&[("name", name)]);

        let response = self.endpoint.send(call, request).await?;
        Endpoint::read_customers(call, response, IdPolicy::Required).await
    }

    async fn create(&self, payload: &CustomerPayload<'_>) -> Result<(), SyncError> {
        let call = SyncCall::CreateDestination;
        let url = self.endpoint.url(call, CLIENT_PATH)?;
        let request = self.endpoint.request(Method::POST, url).json(payload);

        self.endpoint.send(call, request).await?;
        Ok(())
    }

    async fn update(&self, id: &RecordId, payload: &CustomerPayload<'_>) -> Result<(), SyncError> {
        let call = SyncCall::UpdateDestination;
        let url = self.client_url(id)?;
        let request = self.endpoint.request(Method::PUT, url).json(payload);

        self.endpoint.send(call, request).await?;
        Ok(())
    }
}
