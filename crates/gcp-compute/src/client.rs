use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::types::{Address, Operation};
use crate::{ComputeError, Result};

/// Public Compute Engine v1 endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

// ─── ClientOptions ────────────────────────────────────────────────────────

/// Everything needed to build a [`ComputeClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL; override to point at an emulator or a test server.
    pub endpoint: String,
    pub project: String,
    /// OAuth2 bearer token. `None` sends unauthenticated requests.
    pub access_token: Option<String>,
    /// Per-request timeout, covering connect through body read.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project: String::new(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

// ─── ComputeClient ────────────────────────────────────────────────────────

/// Authenticated handle bound to one project.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    http: reqwest::Client,
    endpoint: String,
    project: String,
    access_token: Option<String>,
}

impl ComputeClient {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(opts.timeout).build()?;
        Ok(Self {
            http,
            endpoint: opts.endpoint.trim_end_matches('/').to_string(),
            project: opts.project,
            access_token: opts.access_token,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Regional address service.
    pub fn addresses(&self) -> Addresses {
        Addresses {
            client: self.clone(),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let rb = self.http.request(method, url);
        match &self.access_token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T> {
        let resp = rb.send().await?;
        let status = resp.status();
        let url = resp.url().to_string();
        let body = resp.text().await?;
        tracing::debug!(%url, status = status.as_u16(), "compute api response");

        if !status.is_success() {
            return Err(ComputeError::from_response(status.as_u16(), &body));
        }
        // Some endpoints answer 204 with no body.
        let body = if body.trim().is_empty() {
            "{}".to_string()
        } else {
            body
        };
        serde_json::from_str(&body).map_err(|source| ComputeError::Decode { body, source })
    }
}

// ─── Addresses ────────────────────────────────────────────────────────────

/// `projects/{project}/regions/{region}/addresses` collection.
#[derive(Debug, Clone)]
pub struct Addresses {
    client: ComputeClient,
}

impl Addresses {
    pub async fn get(&self, region: &str, name: &str) -> Result<Address> {
        let url = self.item_url(region, name);
        tracing::debug!(%url, "GET address");
        self.client
            .send(self.client.request(Method::GET, &url))
            .await
    }

    pub async fn insert(&self, region: &str, address: &Address) -> Result<Operation> {
        let url = self.collection_url(region);
        tracing::debug!(%url, name = %address.name, "POST address");
        self.client
            .send(self.client.request(Method::POST, &url).json(address))
            .await
    }

    pub async fn delete(&self, region: &str, name: &str) -> Result<Operation> {
        let url = self.item_url(region, name);
        tracing::debug!(%url, "DELETE address");
        self.client
            .send(self.client.request(Method::DELETE, &url))
            .await
    }

    fn collection_url(&self, region: &str) -> String {
        format!(
            "{}/projects/{}/regions/{}/addresses",
            self.client.endpoint, self.client.project, region
        )
    }

    fn item_url(&self, region: &str, name: &str) -> String {
        format!("{}/{}", self.collection_url(region), name)
    }
}
