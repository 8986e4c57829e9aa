//! Venue profiles
//!
//! A profile is everything the generic adapter engine needs to know about one
//! venue's wire contract: how to build a request, where the client id lives
//! in responses, what a cancel is addressed by, how remote orders identify
//! themselves, and which failures are worth retrying.

pub mod alpaca;
pub mod ccxt;
pub mod oanda;

pub use alpaca::AlpacaProfile;
pub use ccxt::CcxtProfile;
pub use oanda::OandaProfile;

use crate::classifier::Classifier;
use crate::error::{FatalError, Result};
use crate::rate_limit::RateLimit;
use aegis_core::{ClientOrderId, OrderFields, Payload};
use aegis_ports::CancelTarget;
use rust_decimal::Decimal;
use serde_json::Value;

/// Strategy object that parameterises [`crate::VenueAdapter`]
pub trait VenueProfile: Send + Sync + 'static {
    /// Short venue name, also the prefix of generated client ids
    fn name(&self) -> &'static str;

    /// Rate limit applied when the adapter is not configured otherwise
    fn default_rate_limit(&self) -> RateLimit;

    /// Pure mapping from raw transport failures to the adapter taxonomy
    fn classifier(&self) -> Classifier;

    /// Build the venue request for `order`, carrying `id` under the venue's key
    fn build_request(&self, id: &ClientOrderId, order: &OrderFields) -> Result<Payload>;

    /// Make sure a submit response carries `id` under the venue's key
    fn annotate_response(&self, id: &ClientOrderId, request: &Payload, response: &mut Payload);

    /// Payload recorded in the audit log for a submission
    fn submit_audit_payload(&self, _id: &ClientOrderId, request: &Payload) -> Payload {
        request.clone()
    }

    /// Work out what to cancel from the cached submit response
    fn cancel_target(&self, id: &ClientOrderId, cached: &Payload) -> Result<CancelTarget>;

    /// Normalise the venue's cancel acknowledgement
    fn cancel_response(&self, target: &CancelTarget, raw: Option<Payload>) -> Payload;

    /// Payload recorded in the audit log for a cancel
    fn cancel_audit_payload(&self, target: &CancelTarget) -> Payload {
        let mut payload = Payload::new();
        payload.insert("client_id".into(), target.client_order_id.as_str().into());
        if let Some(order_id) = &target.venue_order_id {
            payload.insert("order_id".into(), order_id.as_str().into());
        }
        payload
    }

    /// Identifying token of an order reported by the venue, if any
    fn remote_client_id(&self, order: &Payload) -> Option<String>;
}

/// Decimals travel as strings so no precision is lost on the wire
pub(crate) fn decimal(value: Decimal) -> Value {
    Value::String(value.to_string())
}

/// Follow `path` through nested objects
pub(crate) fn lookup<'a>(payload: &'a Payload, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = payload;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)
}

/// Non-empty string or numeric id rendered as a string
pub(crate) fn id_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First usable id among the aliased `paths`
pub(crate) fn first_id(payload: &Payload, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(payload, path).and_then(id_token))
}

/// Merge caller extras into `target`; the venue's client-id key may not be overridden
pub(crate) fn merge_extras(
    target: &mut Payload,
    order: &OrderFields,
    reserved: &str,
) -> Result<()> {
    for (key, value) in &order.extras {
        if key == reserved {
            return Err(FatalError::InvalidOrder(format!(
                "extra field '{}' would override the client id",
                key
            ))
            .into());
        }
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

/// Nested object at `key`, created (or replaced) when missing
pub(crate) fn object_entry<'a>(payload: &'a mut Payload, key: &str) -> &'a mut Payload {
    let slot = payload
        .entry(key)
        .or_insert_with(|| Value::Object(Payload::new()));
    if !slot.is_object() {
        *slot = Value::Object(Payload::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just made an object"),
    }
}
