use reqwest::Method;

use crate::config::ClientConfig;
use crate::order::{OrderLookup, OrderRequest, RawOrderRequest};
use crate::transport::{ExchangeResponse, HttpTransport, Transport};
use crate::{ORDER_PATH, Result};

/// Order-facing API over a signed [`Transport`].
///
/// Each call is a single attempt; retries are left to the caller.
#[derive(Clone, Debug)]
pub struct ExchangeClient<T = HttpTransport> {
    transport: T,
    order_path: String,
}

impl ExchangeClient<HttpTransport> {
    /// Creates a client talking HTTP to `config.base_url`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> ExchangeClient<T> {
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            order_path: ORDER_PATH.to_owned(),
        }
    }

    /// Overrides the order endpoint, e.g. for a coin-margined `/dapi/v1/order`.
    #[must_use]
    pub fn with_order_path<S: Into<String>>(mut self, path: S) -> Self {
        self.order_path = path.into();
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validates and places an order with `POST` on the order endpoint.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<ExchangeResponse> {
        let params = order.to_params().inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, symbol = %order.symbol, "order rejected locally");
        })?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            symbol = %order.symbol.to_ascii_uppercase(),
            side = %order.side,
            order_type = %order.order_type,
            quantity = %order.quantity,
            "placing order"
        );

        self.transport
            .send(Method::POST, &self.order_path, &params)
            .await
    }

    /// Parses string input, then places it like [`Self::place_order`].
    pub async fn place_raw_order(&self, raw: &RawOrderRequest) -> Result<ExchangeResponse> {
        let order = raw.parse().inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, symbol = %raw.symbol, "order rejected locally");
        })?;
        self.place_order(&order).await
    }

    /// Looks up an order with `GET`. `order_id` wins when both ids are given.
    pub async fn query_order(&self, symbol: &str, lookup: &OrderLookup) -> Result<ExchangeResponse> {
        let params = lookup.to_params(symbol).inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, symbol, "order query rejected locally");
        })?;
        self.transport
            .send(Method::GET, &self.order_path, &params)
            .await
    }

    /// Cancels an order with `DELETE`, using the same id rules as [`Self::query_order`].
    pub async fn cancel_order(&self, symbol: &str, lookup: &OrderLookup) -> Result<ExchangeResponse> {
        let params = lookup.to_params(symbol).inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, symbol, "order cancel rejected locally");
        })?;

        #[cfg(feature = "tracing")]
        tracing::info!(symbol, ?lookup, "cancelling order");

        self.transport
            .send(Method::DELETE, &self.order_path, &params)
            .await
    }
}
