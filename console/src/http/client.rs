//! HTTP client implementation

use std::time::Duration;

use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::authn::authorizer::Headers;
use crate::errors::ConsoleError;

/// A response with its body fully read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ConsoleError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, lossy
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Non-2xx statuses are returned, not raised; only
    /// failures to get a response at all are errors.
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ConsoleError>;
}

/// HTTP client for backend communication
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self, ConsoleError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ConsoleError> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            error!(
                "HTTP {} {} failed: {} - {}",
                method,
                url,
                status,
                String::from_utf8_lossy(&body)
            );
        }

        Ok(HttpResponse { status, body })
    }
}
