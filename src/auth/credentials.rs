//! API key credentials

use base64::Engine as _;
use reqwest::header::HeaderValue;

use crate::error::{Error, Result};

/// API key and secret pair used for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create credentials from an API key and secret
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// The API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base64 token of `key:secret`
    pub fn token(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.api_key, self.api_secret))
    }

    /// `Authorization` header value, marked sensitive so it never shows in logs
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Basic {}", self.token()))
            .map_err(|e| Error::config(format!("Invalid credentials: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
