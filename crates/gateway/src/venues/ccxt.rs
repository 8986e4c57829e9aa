//! CCXT unified API profile
//!
//! Requests mirror `create_order(symbol, type, side, amount, price, params)`:
//! the client id and any venue extras ride in `params`. Cancels use the
//! exchange order id plus the symbol.

use super::{VenueProfile, decimal, first_id, merge_extras};
use crate::classifier::{Classifier, classify_ccxt};
use crate::error::{FatalError, Result};
use crate::rate_limit::RateLimit;
use aegis_core::{ClientOrderId, OrderFields, OrderType, Payload};
use aegis_ports::CancelTarget;
use serde_json::Value;

const CLIENT_ID_KEY: &str = "clientOrderId";

#[derive(Debug, Clone, Copy, Default)]
pub struct CcxtProfile;

impl VenueProfile for CcxtProfile {
    fn name(&self) -> &'static str {
        "ccxt"
    }

    fn default_rate_limit(&self) -> RateLimit {
        RateLimit::per_second(5)
    }

    fn classifier(&self) -> Classifier {
        classify_ccxt
    }

    fn build_request(&self, id: &ClientOrderId, order: &OrderFields) -> Result<Payload> {
        let mut params = Payload::new();
        params.insert(CLIENT_ID_KEY.into(), id.as_str().into());
        if let Some(price) = order.stop_price {
            params.insert("stopPrice".into(), decimal(price));
        }
        merge_extras(&mut params, order, CLIENT_ID_KEY)?;

        let mut request = Payload::new();
        request.insert("symbol".into(), order.symbol.as_str().into());
        request.insert("type".into(), order.order_type.as_str().into());
        request.insert("side".into(), order.side.as_str().into());
        request.insert("amount".into(), decimal(order.quantity));
        // Market orders go out without a price
        if order.order_type != OrderType::Market {
            if let Some(price) = order.limit_price {
                request.insert("price".into(), decimal(price));
            }
        }
        request.insert("params".into(), Value::Object(params));
        Ok(request)
    }

    fn annotate_response(&self, id: &ClientOrderId, request: &Payload, response: &mut Payload) {
        response
            .entry(CLIENT_ID_KEY)
            .or_insert_with(|| id.as_str().into());
        // Cancels are addressed by symbol as well as exchange id
        if let Some(symbol) = request.get("symbol") {
            response
                .entry("symbol")
                .or_insert_with(|| symbol.clone());
        }
    }

    fn submit_audit_payload(&self, id: &ClientOrderId, request: &Payload) -> Payload {
        let mut payload = request.clone();
        payload.insert("client_id".into(), id.as_str().into());
        payload
    }

    fn cancel_target(&self, id: &ClientOrderId, cached: &Payload) -> Result<CancelTarget> {
        let order_id = first_id(cached, &[&["id"], &["orderId"]])
            .ok_or_else(|| FatalError::MissingVenueOrderId(id.clone()))?;
        let symbol = cached
            .get("symbol")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(CancelTarget::by_venue_id(id.clone(), order_id, symbol))
    }

    fn cancel_response(&self, target: &CancelTarget, raw: Option<Payload>) -> Payload {
        let mut response = raw.unwrap_or_default();
        response
            .entry(CLIENT_ID_KEY)
            .or_insert_with(|| target.client_order_id.as_str().into());
        if let Some(symbol) = &target.symbol {
            response
                .entry("symbol")
                .or_insert_with(|| symbol.as_str().into());
        }
        response
    }

    fn remote_client_id(&self, order: &Payload) -> Option<String> {
        first_id(order, &[&["clientOrderId"], &["client_order_id"], &["id"]])
    }
}
