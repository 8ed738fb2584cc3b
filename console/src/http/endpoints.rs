//! URL construction for backend resources
//!
//! The two resource types build their URLs differently; both shapes are
//! kept exactly as the backend routes expect them:
//!
//! - applications: `join([host, namespace], "/") + id + "/"`
//! - instances: `host + "/api/lambda-instances/" + id + "/"`

use url::Url;

use crate::errors::ConsoleError;
use crate::store::records::ResourceKind;

/// Path prefix of the instance endpoints
pub const INSTANCES_PATH: &str = "/api/lambda-instances/";

/// Builds collection and member URLs per resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoint {
    host: String,
    app_namespace: String,
}

impl ResourceEndpoint {
    pub fn new(host: impl Into<String>, app_namespace: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            app_namespace: app_namespace.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL listing every record of `kind`
    pub fn collection_url(&self, kind: ResourceKind) -> Result<String, ConsoleError> {
        let url = match kind {
            ResourceKind::LambdaApp => [self.host.as_str(), self.app_namespace.as_str()].join("/"),
            ResourceKind::LambdaInstance => format!("{}{}", self.host, INSTANCES_PATH),
        };
        validate(url)
    }

    /// URL of a single record, as used by DELETE
    pub fn member_url(&self, kind: ResourceKind, id: &str) -> Result<String, ConsoleError> {
        if id.is_empty() {
            return Err(ConsoleError::ValidationError(format!(
                "empty {} id",
                kind
            )));
        }
        let url = match kind {
            ResourceKind::LambdaApp => {
                let base = [self.host.as_str(), self.app_namespace.as_str()].join("/");
                format!("{}{}/", base, id)
            }
            ResourceKind::LambdaInstance => format!("{}{}{}/", self.host, INSTANCES_PATH, id),
        };
        validate(url)
    }
}

fn validate(url: String) -> Result<String, ConsoleError> {
    Url::parse(&url)?;
    Ok(url)
}
