//! Signed HTTP transport.
//!
//! [`Transport`] is the seam between order logic and the network. The
//! production [`HttpTransport`] injects the timestamp, signs, sends and maps
//! the response onto [`ExchangeResponse`] or an [`Error`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, TransportKind};
use crate::signing::{self, SIGNATURE_PARAM};
use crate::{API_KEY_HEADER, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded reply from the exchange for a request that was accepted.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExchangeResponse {
    pub status_code: u16,
    pub body: Value,
}

impl ExchangeResponse {
    #[must_use]
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// Exchange-assigned order id, when the body carries one.
    #[must_use]
    pub fn order_id(&self) -> Option<u64> {
        self.body.get("orderId").and_then(Value::as_u64)
    }
}

/// Sends one signed request and returns the decoded response.
///
/// Implementations must not mutate `params` and must fail with
/// [`TransportKind::UnsupportedMethod`] for anything but GET, POST and DELETE.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ExchangeResponse>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: Url,
    credentials: Credentials,
    timeout: Duration,
    recv_window: Option<u64>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Self::with_client(config, client)
    }

    /// Uses a caller-provided HTTP client, e.g. one with a custom proxy.
    pub fn with_client(config: ClientConfig, client: ReqwestClient) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            credentials: config.credentials,
            timeout: config.timeout,
            recv_window: config.recv_window,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Copies `params`, then appends `recvWindow`, `timestamp` and `signature`.
    pub fn signed_params(
        &self,
        params: &[(String, String)],
        timestamp_ms: i64,
    ) -> Result<Vec<(String, String)>> {
        let mut signed = params.to_vec();

        if let Some(window) = self.recv_window
            && !signed.iter().any(|(k, _)| k == "recvWindow")
        {
            signed.push(("recvWindow".to_owned(), window.to_string()));
        }
        signed.push(("timestamp".to_owned(), timestamp_ms.to_string()));

        let signature = signing::sign(&signed, self.credentials.api_secret())?;
        signed.push((SIGNATURE_PARAM.to_owned(), signature));
        Ok(signed)
    }

    fn ensure_supported(method: &Method) -> Result<()> {
        if [Method::GET, Method::POST, Method::DELETE].contains(method) {
            Ok(())
        } else {
            Err(Error::transport(
                TransportKind::UnsupportedMethod,
                format!("{method} is not supported; expected GET, POST or DELETE"),
            ))
        }
    }

    async fn send_signed(
        &self,
        method: &Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ExchangeResponse> {
        Self::ensure_supported(method)?;

        let signed = self.signed_params(params, Utc::now().timestamp_millis())?;
        let encoded = signing::encode_query(&signed);
        let mut url = self.base_url.join(path)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %method,
            url = %url,
            params = %redacted(&signed),
            "sending signed request"
        );

        let builder = if *method == Method::POST {
            self.client.request(method.clone(), url).body(encoded)
        } else {
            url.set_query(Some(&encoded));
            self.client.request(method.clone(), url)
        };

        let response = builder
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = status.as_u16(), body = %text, "received response");

        decode(status, &text, method.clone(), path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ExchangeResponse> {
        let result = self.send_signed(&method, path, params).await;

        // Rejections are already logged with their exchange code by `decode`.
        #[cfg(feature = "tracing")]
        if let Err(err) = &result
            && err.kind() != crate::error::Kind::Exchange
        {
            tracing::warn!(
                method = %method,
                path,
                kind = ?err.transport_kind(),
                error = %err,
                "request failed"
            );
        }

        result
    }
}

/// Maps status and raw body text onto a response or an error.
pub(crate) fn decode(
    status: StatusCode,
    text: &str,
    method: Method,
    path: &str,
) -> Result<ExchangeResponse> {
    let decoded = serde_json::from_str::<Value>(text);

    if status.as_u16() >= 400 {
        let (code, message) = match &decoded {
            Ok(value) => rejection_details(value),
            Err(_) => (None, text.to_owned()),
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status,
            method = %method,
            path,
            code = ?code,
            message = %message,
            "exchange rejected request"
        );

        return Err(Error::exchange(status, code, method, path.to_owned(), message));
    }

    let body = decoded.map_err(|e| {
        Error::transport(
            TransportKind::MalformedResponse,
            format!("{e}; body: {text}"),
        )
    })?;

    Ok(ExchangeResponse::new(status.as_u16(), body))
}

/// Pulls `code` and `msg` out of an error envelope, falling back to the whole value.
fn rejection_details(value: &Value) -> (Option<i64>, String) {
    let code = value.get("code").and_then(|code| match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    });
    let message = value
        .get("msg")
        .or_else(|| value.get("message"))
        .map_or_else(
            || value.to_string(),
            |msg| msg.as_str().map_or_else(|| msg.to_string(), ToOwned::to_owned),
        );

    (code, message)
}

#[cfg(feature = "tracing")]
fn redacted(signed: &[(String, String)]) -> String {
    let visible: Vec<(String, String)> = signed
        .iter()
        .map(|(k, v)| {
            if k == SIGNATURE_PARAM {
                (k.clone(), "<redacted>".to_owned())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect();
    signing::encode_query(&visible)
}
