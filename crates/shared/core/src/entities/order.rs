use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{OrderType, Side, TimeInForce};
use crate::values::{Price, Quantity, Symbol};

/// Venue-neutral order fields handed to an adapter's `submit_order`
///
/// Venue profiles turn these into their own request payload. `extras` holds
/// venue-specific optional fields; it is a `BTreeMap` so it always iterates in
/// sorted-key order, whatever order the caller inserted them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    /// Symbol or instrument, in the venue's own notation
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Quantity,
    pub order_type: OrderType,
    /// None means "use the venue's default"
    pub time_in_force: Option<TimeInForce>,
    /// Required for Limit and StopLimit orders
    pub limit_price: Option<Price>,
    /// Required for Stop and StopLimit orders
    pub stop_price: Option<Price>,
    #[serde(default)]
    pub extras: BTreeMap<String, Value>,
}

impl OrderFields {
    pub fn new(
        symbol: impl Into<Symbol>,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            order_type,
            time_in_force: None,
            limit_price: None,
            stop_price: None,
            extras: BTreeMap::new(),
        }
    }

    /// Create a market order
    pub fn market(symbol: impl Into<Symbol>, side: Side, quantity: Quantity) -> Self {
        Self::new(symbol, side, OrderType::Market, quantity)
    }

    /// Create a limit order
    pub fn limit(symbol: impl Into<Symbol>, side: Side, quantity: Quantity, price: Price) -> Self {
        Self::new(symbol, side, OrderType::Limit, quantity).with_limit_price(price)
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_limit_price(mut self, price: Price) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn with_stop_price(mut self, price: Price) -> Self {
        self.stop_price = Some(price);
        self
    }

    /// Attach a venue-specific optional field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Validate the price fields against the order type
    pub fn validate(&self) -> bool {
        if self.quantity <= Decimal::ZERO {
            return false;
        }
        match self.order_type {
            OrderType::Market => true,
            OrderType::Limit => self.limit_price.is_some(),
            OrderType::Stop => self.stop_price.is_some(),
            OrderType::StopLimit => self.limit_price.is_some() && self.stop_price.is_some(),
        }
    }
}
