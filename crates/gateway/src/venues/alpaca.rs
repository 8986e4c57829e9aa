//! Alpaca trading API profile
//!
//! Flat snake_case requests keyed by `client_order_id`; cancels are addressed
//! by client id, so no venue order id is needed.

use super::{VenueProfile, decimal, first_id, merge_extras};
use crate::classifier::{Classifier, classify_alpaca};
use crate::error::Result;
use crate::rate_limit::RateLimit;
use aegis_core::{ClientOrderId, OrderFields, Payload, TimeInForce};
use aegis_ports::CancelTarget;

const CLIENT_ID_KEY: &str = "client_order_id";

#[derive(Debug, Clone, Copy, Default)]
pub struct AlpacaProfile;

impl VenueProfile for AlpacaProfile {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    fn default_rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(180)
    }

    fn classifier(&self) -> Classifier {
        classify_alpaca
    }

    fn build_request(&self, id: &ClientOrderId, order: &OrderFields) -> Result<Payload> {
        let time_in_force = order.time_in_force.unwrap_or(TimeInForce::GTC);

        let mut request = Payload::new();
        request.insert("symbol".into(), order.symbol.as_str().into());
        request.insert("qty".into(), decimal(order.quantity));
        request.insert("side".into(), order.side.as_str().into());
        request.insert("type".into(), order.order_type.as_str().into());
        request.insert("time_in_force".into(), time_in_force.as_str().into());
        request.insert(CLIENT_ID_KEY.into(), id.as_str().into());
        if let Some(price) = order.limit_price {
            request.insert("limit_price".into(), decimal(price));
        }
        if let Some(price) = order.stop_price {
            request.insert("stop_price".into(), decimal(price));
        }
        merge_extras(&mut request, order, CLIENT_ID_KEY)?;
        Ok(request)
    }

    fn annotate_response(&self, id: &ClientOrderId, _request: &Payload, response: &mut Payload) {
        response
            .entry(CLIENT_ID_KEY)
            .or_insert_with(|| id.as_str().into());
    }

    fn cancel_target(&self, id: &ClientOrderId, _cached: &Payload) -> Result<CancelTarget> {
        Ok(CancelTarget::by_client_id(id.clone()))
    }

    fn cancel_response(&self, target: &CancelTarget, raw: Option<Payload>) -> Payload {
        let mut response = raw.unwrap_or_default();
        response
            .entry(CLIENT_ID_KEY)
            .or_insert_with(|| target.client_order_id.as_str().into());
        response
            .entry("status")
            .or_insert_with(|| "canceled".into());
        response
    }

    fn remote_client_id(&self, order: &Payload) -> Option<String> {
        first_id(order, &[&["client_order_id"], &["clientOrderId"], &["id"]])
    }
}
