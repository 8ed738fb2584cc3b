//! Authorization header providers

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::errors::ConsoleError;

/// Scheme of the session authorizer the backend expects
pub const DJANGO_SCHEME: &str = "authorizer:django";

/// Request headers as name/value pairs
pub type Headers = Vec<(String, String)>;

/// Yields the headers a request needs for a given scheme.
///
/// `add_header` is invoked once per header, synchronously.
pub trait Authorizer: Send + Sync {
    fn authorize(
        &self,
        scheme: &str,
        add_header: &mut dyn FnMut(&str, &str),
    ) -> Result<(), ConsoleError>;
}

/// Collect the headers `authorizer` yields for `scheme`
pub fn collect_headers(authorizer: &dyn Authorizer, scheme: &str) -> Result<Headers, ConsoleError> {
    let mut headers = Headers::new();
    authorizer.authorize(scheme, &mut |name, value| {
        headers.push((name.to_string(), value.to_string()));
    })?;
    Ok(headers)
}

/// Token authorizer for the Django session scheme: `Authorization: Token <key>`
pub struct TokenAuthorizer {
    token: Option<SecretString>,
}

impl TokenAuthorizer {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    /// Authorizer for an unauthenticated session
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl Authorizer for TokenAuthorizer {
    fn authorize(
        &self,
        scheme: &str,
        add_header: &mut dyn FnMut(&str, &str),
    ) -> Result<(), ConsoleError> {
        if scheme != DJANGO_SCHEME {
            return Err(ConsoleError::AuthError(format!(
                "unsupported authorizer scheme: {}",
                scheme
            )));
        }

        match &self.token {
            Some(token) => {
                add_header("Authorization", &format!("Token {}", token.expose_secret()));
            }
            None => {
                warn!("No session token configured, sending request without authorization");
            }
        }
        Ok(())
    }
}
