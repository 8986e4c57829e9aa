//! Integration tests: per-venue submit / cancel / reconcile flows
//!
//! Each fake venue keeps its own open-order book and answers in the venue's
//! wire shape, failing the first submit with a transient error.

mod common;

use aegis_clock::{ManualClock, NoopSleeper};
use aegis_core::{ClientOrderId, OrderFields, OrderType, Payload, Price, Side};
use aegis_gateway::{
    AdapterError, AlpacaProfile, AuditAction, CcxtProfile, FatalError, OandaProfile, RetryConfig,
    VenueAdapter,
};
use aegis_ports::{CancelTarget, TransportFailure, TransportResult, VenueTransport};
use async_trait::async_trait;
use common::{init_logging, payload};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn no_wait(max_attempts: u32) -> RetryConfig {
    RetryConfig::immediate(max_attempts)
}

/// Open-order book shared by the fake venues
#[derive(Default)]
struct Book {
    submits: Vec<Payload>,
    cancelled: Vec<CancelTarget>,
    open: Vec<Payload>,
    failures: usize,
}

// ---------------------------------------------------------------------------
// Alpaca
// ---------------------------------------------------------------------------

struct FakeAlpaca {
    book: Mutex<Book>,
}

impl FakeAlpaca {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            book: Mutex::new(Book {
                failures: 1,
                ..Default::default()
            }),
        })
    }
}

#[async_trait]
impl VenueTransport for FakeAlpaca {
    async fn submit_order(&self, request: &Payload) -> TransportResult<Payload> {
        let mut book = self.book.lock();
        book.submits.push(request.clone());
        if book.failures > 0 {
            book.failures -= 1;
            return Err(TransportFailure::Timeout("transient error".into()));
        }
        let order = payload(json!({
            "id": format!("alpaca-{}", book.submits.len()),
            "client_order_id": request["client_order_id"],
            "status": "accepted",
        }));
        book.open = vec![order.clone()];
        Ok(order)
    }

    async fn cancel_order(&self, target: &CancelTarget) -> TransportResult<Option<Payload>> {
        let mut book = self.book.lock();
        book.cancelled.push(target.clone());
        let id = target.client_order_id.as_str();
        book.open.retain(|order| order["client_order_id"] != id);
        Ok(None)
    }

    async fn open_orders(&self) -> TransportResult<Vec<Payload>> {
        Ok(self.book.lock().open.clone())
    }
}

#[tokio::test]
async fn test_alpaca_retries_and_tracks_orders() {
    init_logging();
    let client = FakeAlpaca::new();
    let adapter = VenueAdapter::builder(AlpacaProfile, client.clone())
        .retry_config(no_wait(3))
        .rate_limit(50, Duration::from_secs(60))
        .clock(ManualClock::new())
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    let order = adapter
        .submit_order(
            OrderFields::limit("AAPL", Side::Buy, dec!(10), dec!(189.5)),
            Some("alpaca-123".into()),
        )
        .await
        .unwrap();
    assert_eq!(order["client_order_id"], "alpaca-123");
    assert_eq!(client.book.lock().submits.len(), 2);
    assert_eq!(client.book.lock().submits[1]["client_order_id"], "alpaca-123");

    let cancelled = adapter.cancel_order(&"alpaca-123".into()).await.unwrap();
    assert_eq!(cancelled["status"], "canceled");
    assert_eq!(
        client.book.lock().cancelled,
        vec![CancelTarget::by_client_id("alpaca-123".into())]
    );

    let report = adapter.reconcile().await.unwrap();
    assert_eq!(report.missing_remote, vec!["alpaca-123"]);

    client.book.lock().open = vec![
        payload(json!({"client_order_id": "alpaca-123"})),
        payload(json!({"client_order_id": "alpaca-extra"})),
    ];
    let report = adapter.reconcile().await.unwrap();
    assert!(report.missing_remote.is_empty());
    assert_eq!(report.untracked_remote, vec!["alpaca-extra"]);
}

#[tokio::test]
async fn test_alpaca_resubmit_after_cancel_keeps_client_id() {
    let client = FakeAlpaca::new();
    let adapter = VenueAdapter::builder(AlpacaProfile, client.clone())
        .retry_config(no_wait(3))
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();
    let order = || OrderFields::market("AAPL", Side::Buy, dec!(5));

    adapter.submit_order(order(), Some("alpaca-x".into())).await.unwrap();
    adapter.cancel_order(&"alpaca-x".into()).await.unwrap();
    let replay = adapter.submit_order(order(), Some("alpaca-x".into())).await.unwrap();

    assert_eq!(replay["client_order_id"], "alpaca-x");
    assert_eq!(replay["status"], "canceled");
    assert_eq!(client.book.lock().submits.len(), 2);
}

#[tokio::test]
async fn test_alpaca_cancel_unknown_client_id() {
    let client = FakeAlpaca::new();
    let adapter = VenueAdapter::builder(AlpacaProfile, client.clone())
        .retry_config(no_wait(1))
        .build()
        .unwrap();

    let err = adapter.cancel_order(&"missing".into()).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(client.book.lock().cancelled.is_empty());
}

// ---------------------------------------------------------------------------
// OANDA
// ---------------------------------------------------------------------------

struct FakeOanda {
    book: Mutex<Book>,
}

impl FakeOanda {
    fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            book: Mutex::new(Book {
                failures,
                ..Default::default()
            }),
        })
    }
}

#[async_trait]
impl VenueTransport for FakeOanda {
    async fn submit_order(&self, request: &Payload) -> TransportResult<Payload> {
        let mut book = self.book.lock();
        book.submits.push(request.clone());
        if book.failures > 0 {
            book.failures -= 1;
            return Err(TransportFailure::Timeout("network hiccup".into()));
        }
        let order = payload(json!({
            "id": format!("order-{}", book.open.len() + 1),
            "clientExtensions": {"id": request["order"]["clientExtensions"]["id"]},
        }));
        book.open = vec![order.clone()];
        Ok(order)
    }

    async fn cancel_order(&self, target: &CancelTarget) -> TransportResult<Option<Payload>> {
        let mut book = self.book.lock();
        book.cancelled.push(target.clone());
        let order_id = target.venue_order_id.clone().unwrap_or_default();
        book.open.retain(|order| order["id"] != order_id.as_str());
        Ok(Some(payload(json!({
            "orderCancelTransaction": {
                "id": format!("{}", 8 + book.cancelled.len()),
                "orderID": order_id,
                "reason": "CLIENT_REQUEST",
            }
        }))))
    }

    async fn open_orders(&self) -> TransportResult<Vec<Payload>> {
        Ok(self.book.lock().open.clone())
    }
}

#[tokio::test]
async fn test_oanda_signed_units_and_retries() {
    init_logging();
    let client = FakeOanda::new(1);
    let adapter = VenueAdapter::builder(OandaProfile, client.clone())
        .retry_config(no_wait(3))
        .clock(ManualClock::new())
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    let order = adapter
        .submit_order(
            OrderFields::limit("EUR_USD", Side::Sell, dec!(1000), dec!(1.1)),
            Some("oanda-1".into()),
        )
        .await
        .unwrap();
    assert_eq!(order["clientExtensions"]["id"], "oanda-1");
    assert_eq!(client.book.lock().submits.len(), 2);
    assert_eq!(client.book.lock().submits[1]["order"]["units"], "-1000");

    let cancelled = adapter.cancel_order(&"oanda-1".into()).await.unwrap();
    assert_eq!(cancelled["orderCancelTransaction"]["orderID"], "order-1");
    assert_eq!(cancelled["client_id"], "oanda-1");
    let targets = client.book.lock().cancelled.clone();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].venue_order_id.as_deref(), Some("order-1"));

    let report = adapter.reconcile().await.unwrap();
    assert_eq!(report.missing_remote, vec!["oanda-1"]);

    client.book.lock().open = vec![
        payload(json!({"clientExtensions": {"id": "oanda-1"}})),
        payload(json!({"clientExtensions": {"id": "oanda-extra"}})),
    ];
    let report = adapter.reconcile().await.unwrap();
    assert!(report.missing_remote.is_empty());
    assert_eq!(report.untracked_remote, vec!["oanda-extra"]);
}

#[tokio::test]
async fn test_oanda_resubmit_after_cancel_keeps_client_extensions() {
    let client = FakeOanda::new(0);
    let adapter = VenueAdapter::builder(OandaProfile, client.clone())
        .retry_config(no_wait(1))
        .build()
        .unwrap();
    let order = || OrderFields::market("EUR_USD", Side::Buy, dec!(100));

    adapter.submit_order(order(), Some("oanda-x".into())).await.unwrap();
    let cancelled = adapter.cancel_order(&"oanda-x".into()).await.unwrap();
    assert_eq!(
        Value::Object(cancelled),
        json!({
            "orderCancelTransaction": {"id": "9", "orderID": "order-1", "reason": "CLIENT_REQUEST"},
            "client_id": "oanda-x",
        })
    );

    let replay = adapter.submit_order(order(), Some("oanda-x".into())).await.unwrap();
    assert_eq!(replay["clientExtensions"]["id"], "oanda-x");
    assert_eq!(replay["orderCancelTransaction"]["id"], "9");
    assert_eq!(client.book.lock().submits.len(), 1);
}

#[tokio::test]
async fn test_oanda_cancel_needs_venue_order_id() {
    let client = FakeOanda::new(0);
    let adapter = VenueAdapter::builder(OandaProfile, client.clone())
        .retry_config(no_wait(1))
        .build()
        .unwrap();
    let id = ClientOrderId::from("oanda-seeded");

    // Seeded without a venue id, e.g. from a previous session
    adapter
        .cache()
        .update(&id, payload(json!({"state": "PENDING"})));

    let err = adapter.cancel_order(&id).await.unwrap_err();
    assert_eq!(err, FatalError::MissingVenueOrderId(id).into());
    assert!(client.book.lock().cancelled.is_empty());

    let unknown = adapter.cancel_order(&"missing".into()).await.unwrap_err();
    assert!(matches!(unknown, AdapterError::Fatal(FatalError::UnknownClientId(_))));
}

// ---------------------------------------------------------------------------
// CCXT
// ---------------------------------------------------------------------------

struct FakeCcxt {
    book: Mutex<Book>,
}

impl FakeCcxt {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            book: Mutex::new(Book {
                failures: 1,
                ..Default::default()
            }),
        })
    }
}

#[async_trait]
impl VenueTransport for FakeCcxt {
    async fn submit_order(&self, request: &Payload) -> TransportResult<Payload> {
        let mut book = self.book.lock();
        book.submits.push(request.clone());
        if book.failures > 0 {
            book.failures -= 1;
            return Err(TransportFailure::venue("NetworkError", "temporary network error"));
        }
        let order = payload(json!({
            "id": format!("order-{}", book.submits.len()),
            "symbol": request["symbol"],
            "side": request["side"],
            "type": request["type"],
            "amount": request["amount"],
            "price": request.get("price").cloned().unwrap_or(Value::Null),
            "clientOrderId": request["params"]["clientOrderId"],
            "status": "open",
        }));
        book.open = vec![order.clone()];
        Ok(order)
    }

    async fn cancel_order(&self, target: &CancelTarget) -> TransportResult<Option<Payload>> {
        let mut book = self.book.lock();
        book.cancelled.push(target.clone());
        let order_id = target.venue_order_id.clone().unwrap_or_default();
        book.open.retain(|order| order["id"] != order_id.as_str());
        Ok(Some(payload(json!({
            "id": order_id,
            "symbol": target.symbol,
            "status": "canceled",
        }))))
    }

    async fn open_orders(&self) -> TransportResult<Vec<Payload>> {
        Ok(self.book.lock().open.clone())
    }
}

fn btc_limit(price: Price) -> OrderFields {
    OrderFields::limit("BTC/USDT", Side::Buy, dec!(0.1), price)
}

#[tokio::test]
async fn test_ccxt_retries_and_enforces_idempotency() {
    init_logging();
    let client = FakeCcxt::new();
    let adapter = VenueAdapter::builder(CcxtProfile, client.clone())
        .retry_config(no_wait(3))
        .rate_limit(10, Duration::from_secs(1))
        .clock(ManualClock::new())
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    let order = adapter
        .submit_order(btc_limit(dec!(20000)), Some("cid-1".into()))
        .await
        .unwrap();
    assert_eq!(order["clientOrderId"], "cid-1");
    let audit = adapter.audit_log();
    assert_eq!(audit.last().map(|r| r.action), Some(AuditAction::SubmitOrder));
    assert_eq!(audit[0].payload["client_id"], "cid-1");

    let cached = adapter
        .submit_order(btc_limit(dec!(20000)), Some("cid-1".into()))
        .await
        .unwrap();
    assert_eq!(cached, order);
    assert_eq!(client.book.lock().submits.len(), 2);

    let err = adapter
        .submit_order(btc_limit(dec!(21000)), Some("cid-1".into()))
        .await
        .unwrap_err();
    assert_eq!(err, FatalError::OrderConflict("cid-1".into()).into());
}

#[tokio::test]
async fn test_ccxt_cancel_and_reconcile_track_state() {
    let client = FakeCcxt::new();
    let adapter = VenueAdapter::builder(CcxtProfile, client.clone())
        .retry_config(no_wait(2))
        .rate_limit(10, Duration::from_secs(1))
        .clock(ManualClock::new())
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    adapter
        .submit_order(btc_limit(dec!(20000)), Some("cid-keep".into()))
        .await
        .unwrap();
    client.book.lock().open.clear();

    let report = adapter.reconcile().await.unwrap();
    assert_eq!(report.missing_remote, vec!["cid-keep"]);

    client.book.lock().open = vec![payload(json!({"id": "order-keep", "clientOrderId": "cid-keep"}))];
    let report = adapter.reconcile().await.unwrap();
    assert!(report.is_clean());

    client
        .book
        .lock()
        .open
        .push(payload(json!({"id": "order-extra", "clientOrderId": "cid-extra"})));
    let report = adapter.reconcile().await.unwrap();
    assert_eq!(report.untracked_remote, vec!["cid-extra"]);

    let cancelled = adapter.cancel_order(&"cid-keep".into()).await.unwrap();
    assert_eq!(cancelled["clientOrderId"], "cid-keep");
    assert_eq!(cancelled["status"], "canceled");
    let target = client.book.lock().cancelled[0].clone();
    assert_eq!(target.venue_order_id.as_deref(), Some("order-2"));
    assert_eq!(target.symbol.as_deref(), Some("BTC/USDT"));

    let cancel_record = adapter
        .audit_log()
        .into_iter()
        .find(|r| r.action == AuditAction::CancelOrder)
        .unwrap();
    assert_eq!(
        Value::Object(cancel_record.payload),
        json!({"client_id": "cid-keep", "order_id": "order-2"})
    );
}

#[tokio::test]
async fn test_ccxt_resubmit_after_cancel_keeps_client_id_and_symbol() {
    let client = FakeCcxt::new();
    let adapter = VenueAdapter::builder(CcxtProfile, client.clone())
        .retry_config(no_wait(2))
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    adapter
        .submit_order(btc_limit(dec!(20000)), Some("cid-x".into()))
        .await
        .unwrap();
    adapter.cancel_order(&"cid-x".into()).await.unwrap();

    // Acknowledgement without the keys the submit response carries
    let mut stripped = adapter.cache().get(&"cid-x".into()).unwrap();
    stripped.remove("symbol");
    stripped.remove("clientOrderId");
    adapter.cache().update(&"cid-x".into(), stripped);

    let replay = adapter
        .submit_order(btc_limit(dec!(20000)), Some("cid-x".into()))
        .await
        .unwrap();
    assert_eq!(replay["clientOrderId"], "cid-x");
    assert_eq!(replay["symbol"], "BTC/USDT");
    assert_eq!(replay["status"], "canceled");
    assert_eq!(client.book.lock().submits.len(), 2);
}

#[tokio::test]
async fn test_ccxt_market_order_goes_out_without_price() {
    let client = FakeCcxt::new();
    let adapter = VenueAdapter::builder(CcxtProfile, client.clone())
        .retry_config(no_wait(2))
        .sleeper(Arc::new(NoopSleeper))
        .build()
        .unwrap();

    let response = adapter
        .submit_order(
            OrderFields::new("BTC/USDT", Side::Sell, OrderType::Market, dec!(0.5)),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response["clientOrderId"], "ccxt-000001");
    assert_eq!(response["price"], Value::Null);
    assert!(!client.book.lock().submits[1].contains_key("price"));
}
