use crate::error::TransportResult;
use aegis_core::{ClientOrderId, Payload};
use async_trait::async_trait;

/// Identifies the order a cancel call refers to
///
/// Venues differ in what they cancel by: some accept the client id, others
/// need their own order id (and sometimes the symbol).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelTarget {
    pub client_order_id: ClientOrderId,
    pub venue_order_id: Option<String>,
    pub symbol: Option<String>,
}

impl CancelTarget {
    pub fn by_client_id(client_order_id: ClientOrderId) -> Self {
        Self {
            client_order_id,
            venue_order_id: None,
            symbol: None,
        }
    }

    pub fn by_venue_id(
        client_order_id: ClientOrderId,
        venue_order_id: impl Into<String>,
        symbol: Option<String>,
    ) -> Self {
        Self {
            client_order_id,
            venue_order_id: Some(venue_order_id.into()),
            symbol,
        }
    }
}

/// Port for the venue RPC client
///
/// One transport instance talks to one venue account. Payloads are in the
/// venue's own wire shape; the adapter never interprets fields beyond the ones
/// its venue profile names.
#[async_trait]
pub trait VenueTransport: Send + Sync {
    /// Submit a new order request
    async fn submit_order(&self, request: &Payload) -> TransportResult<Payload>;

    /// Cancel an order; `None` when the venue acknowledges without a body
    async fn cancel_order(&self, target: &CancelTarget) -> TransportResult<Option<Payload>>;

    /// List the venue's open/pending orders
    async fn open_orders(&self) -> TransportResult<Vec<Payload>>;
}
