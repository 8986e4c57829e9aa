//! OANDA v20 profile
//!
//! Orders are wrapped in an `{"order": {...}}` envelope, units are signed
//! (negative for sells) and the client id travels in `clientExtensions.id`.
//! Cancels need OANDA's own order id.

use super::{VenueProfile, decimal, first_id, merge_extras, object_entry};
use crate::classifier::{Classifier, classify_oanda};
use crate::error::{FatalError, Result};
use crate::rate_limit::RateLimit;
use aegis_core::{ClientOrderId, OrderFields, Payload, Side, TimeInForce};
use aegis_ports::CancelTarget;
use serde_json::{Value, json};

const CLIENT_EXTENSIONS_KEY: &str = "clientExtensions";

#[derive(Debug, Clone, Copy, Default)]
pub struct OandaProfile;

fn signed_units(order: &OrderFields) -> Value {
    decimal(match order.side {
        Side::Buy => order.quantity,
        Side::Sell => -order.quantity,
    })
}

impl VenueProfile for OandaProfile {
    fn name(&self) -> &'static str {
        "oanda"
    }

    fn default_rate_limit(&self) -> RateLimit {
        RateLimit::per_minute(120)
    }

    fn classifier(&self) -> Classifier {
        classify_oanda
    }

    fn build_request(&self, id: &ClientOrderId, order: &OrderFields) -> Result<Payload> {
        let time_in_force = order.time_in_force.unwrap_or(TimeInForce::FOK);

        let mut body = Payload::new();
        body.insert("instrument".into(), order.symbol.as_str().into());
        body.insert("units".into(), signed_units(order));
        body.insert("type".into(), order.order_type.as_str().to_uppercase().into());
        body.insert("timeInForce".into(), time_in_force.as_str().to_uppercase().into());
        body.insert("positionFill".into(), "DEFAULT".into());
        body.insert(CLIENT_EXTENSIONS_KEY.into(), json!({ "id": id.as_str() }));
        if let Some(price) = order.limit_price.or(order.stop_price) {
            body.insert("price".into(), decimal(price));
        }
        merge_extras(&mut body, order, CLIENT_EXTENSIONS_KEY)?;

        let mut request = Payload::new();
        request.insert("order".into(), Value::Object(body));
        Ok(request)
    }

    fn annotate_response(&self, id: &ClientOrderId, _request: &Payload, response: &mut Payload) {
        object_entry(response, CLIENT_EXTENSIONS_KEY)
            .entry("id")
            .or_insert_with(|| id.as_str().into());
    }

    fn cancel_target(&self, id: &ClientOrderId, cached: &Payload) -> Result<CancelTarget> {
        let order_id = first_id(
            cached,
            &[
                &["id"],
                &["orderId"],
                &["order", "id"],
                &["orderCreateTransaction", "id"],
            ],
        )
        .ok_or_else(|| FatalError::MissingVenueOrderId(id.clone()))?;
        Ok(CancelTarget::by_venue_id(id.clone(), order_id, None))
    }

    fn cancel_response(&self, target: &CancelTarget, raw: Option<Payload>) -> Payload {
        let mut response = raw.unwrap_or_default();
        response
            .entry("client_id")
            .or_insert_with(|| target.client_order_id.as_str().into());
        response
    }

    fn remote_client_id(&self, order: &Payload) -> Option<String> {
        first_id(order, &[&[CLIENT_EXTENSIONS_KEY, "id"], &["id"]])
    }
}
