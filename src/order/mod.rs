//! Order placement, lookup and cancellation.
//!
//! Requests are validated and normalized here before anything is signed:
//! symbols are upper-cased, quantities and prices go out as decimal strings,
//! and LIMIT orders must carry a price.

mod client;
mod types;

pub use client::ExchangeClient;
pub use types::{
    DEFAULT_TIME_IN_FORCE, OrderLookup, OrderRequest, OrderType, PositionSide, RawOrderRequest,
    Side,
};
