#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod config;
pub mod error;
pub mod order;
pub mod signing;
pub mod transport;
pub mod twap;

use std::time::Duration;

pub use config::{ClientConfig, Credentials};
pub use error::{Error, Kind};
pub use order::{ExchangeClient, OrderLookup, OrderRequest, OrderType, PositionSide, Side};
pub use transport::{ExchangeResponse, HttpTransport, Transport};
pub use twap::{TwapExecutor, TwapPlan, TwapResult};

pub type Result<T> = std::result::Result<T, Error>;

/// USD-M futures testnet.
pub const DEFAULT_BASE_URL: &str = "https://testnet.binancefuture.com";

/// Endpoint for placing (POST), querying (GET) and cancelling (DELETE) orders.
pub const ORDER_PATH: &str = "/fapi/v1/order";

/// Header carrying the raw API key on every signed request.
pub const API_KEY_HEADER: &str = "API-KEY";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest `recvWindow` the exchange accepts.
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;
