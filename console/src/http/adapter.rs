//! Store adapter backed by the HTTP API

use std::sync::Arc;

use api_models::ListResponse;
use async_trait::async_trait;
use http::Method;
use tracing::debug;

use crate::authn::authorizer::{collect_headers, Authorizer};
use crate::errors::ConsoleError;
use crate::http::client::Transport;
use crate::http::endpoints::ResourceEndpoint;
use crate::store::records::ResourceKind;
use crate::store::resource_store::ResourceAdapter;

/// Loads collections with authorized `GET` requests
pub struct HttpAdapter {
    transport: Arc<dyn Transport>,
    authorizer: Arc<dyn Authorizer>,
    endpoints: ResourceEndpoint,
    auth_scheme: String,
}

impl HttpAdapter {
    pub fn new(
        transport: Arc<dyn Transport>,
        authorizer: Arc<dyn Authorizer>,
        endpoints: ResourceEndpoint,
        auth_scheme: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            authorizer,
            endpoints,
            auth_scheme: auth_scheme.into(),
        }
    }
}

#[async_trait]
impl ResourceAdapter for HttpAdapter {
    async fn fetch_all(
        &self,
        kind: ResourceKind,
    ) -> Result<Vec<serde_json::Value>, ConsoleError> {
        let url = self.endpoints.collection_url(kind)?;
        let headers = collect_headers(self.authorizer.as_ref(), &self.auth_scheme)?;

        let response = self.transport.request(Method::GET, &url, &headers, None).await?;
        if !response.is_success() {
            return Err(ConsoleError::RequestFailed {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }

        let list: ListResponse<serde_json::Value> = response.json()?;
        debug!("Fetched {} {} record(s)", list.data.len(), kind);
        Ok(list.data)
    }
}
