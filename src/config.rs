use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::{DEFAULT_TIMEOUT, MAX_RECV_WINDOW_MS};

/// API key pair used to sign requests.
///
/// Immutable once built. `Debug` never prints either value.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: SecretString,
}

impl Credentials {
    pub fn new<K: Into<String>, S: Into<String>>(api_key: K, api_secret: S) -> Result<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.trim().is_empty() {
            return Err(Error::config("api key must not be empty"));
        }
        if api_secret.trim().is_empty() {
            return Err(Error::config("api secret must not be empty"));
        }
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(Error::config(
                "api key contains characters not allowed in an HTTP header",
            ));
        }

        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        })
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Connection settings for [`crate::ExchangeClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub timeout: Duration,
    /// Optional `recvWindow` in milliseconds added to every signed request.
    pub recv_window: Option<u64>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            timeout: DEFAULT_TIMEOUT,
            recv_window: None,
        }
    }

    /// Builds a config from plain strings, as read from flags or the environment.
    pub fn from_raw(base_url: &str, api_key: &str, api_secret: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let credentials = Credentials::new(api_key, api_secret)?;

        let config = Self::new(base_url, credentials);
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window = Some(recv_window_ms);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base url must be http or https, got `{}`",
                self.base_url
            )));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base url `{}` cannot be joined with a path",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("request timeout must be greater than zero"));
        }
        if let Some(window) = self.recv_window
            && (window == 0 || window > MAX_RECV_WINDOW_MS)
        {
            return Err(Error::config(format!(
                "recvWindow must be within 1..={MAX_RECV_WINDOW_MS} ms, got {window}"
            )));
        }
        Ok(())
    }
}
