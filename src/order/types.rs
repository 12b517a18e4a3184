use std::str::FromStr;

use bon::Builder;
use rust_decimal::Decimal;
use serde::Serialize;
use strum_macros::Display;

use crate::Result;
use crate::error::Error;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(value: &str) -> Result<Side> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(Error::validation(format!(
                "invalid side `{other}`; expected one of: BUY|SELL"
            ))),
        }
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn parse(value: &str) -> Result<OrderType> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            other => Err(Error::validation(format!(
                "invalid order type `{other}`; expected one of: MARKET|LIMIT"
            ))),
        }
    }
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn parse(value: &str) -> Result<PositionSide> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(PositionSide::Long),
            "SHORT" => Ok(PositionSide::Short),
            other => Err(Error::validation(format!(
                "invalid position side `{other}`; expected one of: LONG|SHORT"
            ))),
        }
    }
}

macro_rules! impl_from_str {
    ($($ty:ty),+) => {
        $(
            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    <$ty>::parse(s)
                }
            }
        )+
    };
}

impl_from_str!(Side, OrderType, PositionSide);

pub const DEFAULT_TIME_IN_FORCE: &str = "GTC";

/// A single order to place.
///
/// `price` is required for [`OrderType::Limit`] and ignored for market orders.
#[non_exhaustive]
#[derive(Builder, Clone, Debug)]
pub struct OrderRequest {
    #[builder(into)]
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    #[builder(into, default = DEFAULT_TIME_IN_FORCE.to_owned())]
    pub time_in_force: String,
    pub position_side: Option<PositionSide>,
    #[builder(default)]
    pub reduce_only: bool,
    #[builder(into)]
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    #[must_use]
    pub fn market<S: Into<String>>(symbol: S, side: Side, quantity: Decimal) -> Self {
        Self::builder()
            .symbol(symbol)
            .side(side)
            .order_type(OrderType::Market)
            .quantity(quantity)
            .build()
    }

    #[must_use]
    pub fn limit<S: Into<String>>(symbol: S, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self::builder()
            .symbol(symbol)
            .side(side)
            .order_type(OrderType::Limit)
            .quantity(quantity)
            .price(price)
            .build()
    }

    /// Checks the request and renders it as signed-request parameters.
    pub(crate) fn to_params(&self) -> Result<Vec<(String, String)>> {
        let price = match self.order_type {
            OrderType::Limit => Some(
                self.price
                    .ok_or_else(|| Error::validation("LIMIT order requires price"))?,
            ),
            OrderType::Market => None,
        };

        let symbol = normalize_symbol(&self.symbol)?;

        if self.quantity <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if let Some(price) = price
            && price <= Decimal::ZERO
        {
            return Err(Error::validation(format!(
                "price must be positive, got {price}"
            )));
        }

        let mut params = vec![
            ("symbol".to_owned(), symbol),
            ("side".to_owned(), self.side.to_string()),
            ("type".to_owned(), self.order_type.to_string()),
            ("quantity".to_owned(), decimal_param(self.quantity)),
        ];
        if let Some(position_side) = self.position_side {
            params.push(("positionSide".to_owned(), position_side.to_string()));
        }
        if self.reduce_only {
            params.push(("reduceOnly".to_owned(), "true".to_owned()));
        }
        if let Some(id) = self.client_order_id.as_deref().filter(|id| !id.is_empty()) {
            params.push(("newClientOrderId".to_owned(), id.to_owned()));
        }
        if let Some(price) = price {
            let tif = self.time_in_force.trim();
            let tif = if tif.is_empty() {
                DEFAULT_TIME_IN_FORCE.to_owned()
            } else {
                tif.to_ascii_uppercase()
            };
            params.push(("price".to_owned(), decimal_param(price)));
            params.push(("timeInForce".to_owned(), tif));
        }

        Ok(params)
    }
}

/// Order input as strings, typically straight from the command line.
///
/// Converted with [`RawOrderRequest::parse`], which validates side, then order
/// type, then the LIMIT price rule, in that order.
#[derive(Clone, Debug, Default)]
pub struct RawOrderRequest {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub time_in_force: Option<String>,
    pub position_side: Option<String>,
    pub reduce_only: bool,
    pub client_order_id: Option<String>,
}

impl RawOrderRequest {
    pub fn parse(&self) -> Result<OrderRequest> {
        let side = Side::parse(&self.side)?;
        let order_type = OrderType::parse(&self.order_type)?;
        if order_type == OrderType::Limit && self.price.is_none() {
            return Err(Error::validation("LIMIT order requires price"));
        }
        let position_side = self
            .position_side
            .as_deref()
            .map(PositionSide::parse)
            .transpose()?;

        Ok(OrderRequest::builder()
            .symbol(self.symbol.clone())
            .side(side)
            .order_type(order_type)
            .quantity(self.quantity)
            .maybe_price(self.price)
            .time_in_force(
                self.time_in_force
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TIME_IN_FORCE.to_owned()),
            )
            .maybe_position_side(position_side)
            .reduce_only(self.reduce_only)
            .maybe_client_order_id(self.client_order_id.clone())
            .build())
    }
}

/// Identifies an existing order. When both ids are set the exchange id wins.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderLookup {
    pub order_id: Option<u64>,
    pub client_order_id: Option<String>,
}

impl OrderLookup {
    #[must_use]
    pub fn by_order_id(order_id: u64) -> Self {
        Self {
            order_id: Some(order_id),
            client_order_id: None,
        }
    }

    #[must_use]
    pub fn by_client_order_id<S: Into<String>>(client_order_id: S) -> Self {
        Self {
            order_id: None,
            client_order_id: Some(client_order_id.into()),
        }
    }

    #[must_use]
    pub fn new(order_id: Option<u64>, client_order_id: Option<String>) -> Self {
        Self {
            order_id,
            client_order_id,
        }
    }

    pub(crate) fn to_params(&self, symbol: &str) -> Result<Vec<(String, String)>> {
        let symbol = normalize_symbol(symbol)?;
        let id = match (self.order_id, self.client_order_id.as_deref()) {
            (Some(order_id), _) => ("orderId".to_owned(), order_id.to_string()),
            (None, Some(client_id)) if !client_id.trim().is_empty() => {
                ("origClientOrderId".to_owned(), client_id.trim().to_owned())
            }
            _ => {
                return Err(Error::validation(
                    "either order_id or client_order_id is required",
                ));
            }
        };

        Ok(vec![("symbol".to_owned(), symbol), id])
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(Error::validation("symbol must not be empty"));
    }
    Ok(symbol.to_ascii_uppercase())
}

/// Plain decimal notation without trailing zeros, e.g. `0.2` rather than `0.20000000`.
fn decimal_param(value: Decimal) -> String {
    value.normalize().to_string()
}
