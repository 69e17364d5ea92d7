use async_trait::async_trait;
use clientsync_core::config::EndpointConfig;
use clientsync_core::{Customer, IdPolicy, SourceDirectory, SyncCall, SyncError};
use reqwest::Method;

use crate::endpoint::{Endpoint, HttpSetupError};

const CUSTOMER_PATH: &str = "/api/v2/customer";

/// Customer directory read through `GET /api/v2/customer?limit=..&offset=..`.
pub struct HttpSourceDirectory {
    endpoint: Endpoint,
}

impl HttpSourceDirectory {
    pub fn new(config: &EndpointConfig) -> Result<Self, HttpSetupError> {
        Ok(Self { endpoint: Endpoint::from_config("source", config)? })
    }
}

#[async_trait]
impl SourceDirectory for HttpSourceDirectory {
    async fn fetch_page(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, SyncError> {
        let call = SyncCall::ListSource;
        let url = self.endpoint.url(call, CUSTOMER_PATH)?;
        let request =
            self.endpoint.request(Method::GET, url).query(&[("limit", limit), ("offset", offset)]);

        let response = self.endpoint.send(call, request).await?;
        Endpoint::read_customers(call, response, IdPolicy::Optional).await
    }
}
