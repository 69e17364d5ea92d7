use clientsync_core::config::EndpointConfig;
use clientsync_core::{validate_sequence, Customer, IdPolicy, Rejection, SyncCall, SyncError};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum HttpSetupError {
    #[error("{endpoint}.base_url `{url}` is not a valid URL: {message}")]
    InvalidBaseUrl { endpoint: &'static str, url: String, message: String },
    #[error("{endpoint}.base_url `{url}` cannot be used as a base address")]
    UnsupportedBaseUrl { endpoint: &'static str, url: String },
    #[error("{endpoint}.api_key contains characters that are not allowed in an HTTP header")]
    InvalidCredential { endpoint: &'static str },
    #[error("http client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}

/// One remote directory: base address, credential, and the client used for every call to it.
pub(crate) struct Endpoint {
    base_url: Url,
    authorization: HeaderValue,
    client: Client,
}

impl Endpoint {
    pub(crate) fn from_config(
        name: &'static str,
        config: &EndpointConfig,
    ) -> Result<Self, HttpSetupError> {
        let raw_url = config.base_url.trim();
        let base_url = Url::parse(raw_url).map_err(|error| HttpSetupError::InvalidBaseUrl {
            endpoint: name,
            url: raw_url.to_string(),
            message: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(HttpSetupError::UnsupportedBaseUrl {
                endpoint: name,
                url: raw_url.to_string(),
            });
        }

        let mut authorization = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| HttpSetupError::InvalidCredential { endpoint: name })?;
        authorization.set_sensitive(true);

        let client = Client::builder()
            .user_agent(concat!("clientsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, authorization, client })
    }

    /// Resolves `path` as an absolute path against the base address.
    pub(crate) fn url(&self, call: SyncCall, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path)
            .map_err(|error| SyncError::Connection { call, message: error.to_string() })
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).header(AUTHORIZATION, self.authorization.clone())
    }

    /// Sends the request and accepts nothing but `200 OK`.
    pub(crate) async fn send(
        &self,
        call: SyncCall,
        request: RequestBuilder,
    ) -> Result<Response, SyncError> {
        let response = request.send().await.map_err(|error| {
            warn!(call = call.as_str(), error = %error, "request could not be completed");
            SyncError::Connection { call, message: error.to_string() }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(call = call.as_str(), status = %status, "request returned unexpected status");
            return Err(SyncError::Transport { call, status: status.as_u16() });
        }

        debug!(call = call.as_str(), url = %response.url(), "request succeeded");
        Ok(response)
    }

    pub(crate) async fn read_customers(
        call: SyncCall,
        response: Response,
        id_policy: IdPolicy,
    ) -> Result<Vec<Customer>, SyncError> {
        let body: Value = response.json().await.map_err(|error| SyncError::Validation {
            call,
            reason: Rejection::MalformedBody(error.to_string()),
        })?;

        validate_sequence(&body, id_policy).map_err(|reason| SyncError::Validation { call, reason })
    }
}
