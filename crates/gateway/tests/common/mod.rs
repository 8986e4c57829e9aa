//! Test doubles shared by the integration tests

#![allow(dead_code)]

use aegis_clock::ManualClock;
use aegis_core::Payload;
use aegis_ports::{CancelTarget, Sleeper, TransportFailure, TransportResult, VenueTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap_or_default()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport whose failures are scripted up front
///
/// Submits fail with the queued failures first, then echo the request back
/// with a venue id. Cancels acknowledge without a body unless scripted.
/// Open orders are whatever was last set with [`ScriptedTransport::set_open_orders`].
#[derive(Default)]
pub struct ScriptedTransport {
    submit_failures: Mutex<VecDeque<TransportFailure>>,
    cancel_responses: Mutex<VecDeque<TransportResult<Option<Payload>>>>,
    listing_failures: Mutex<VecDeque<TransportFailure>>,
    open_orders: Mutex<Vec<Payload>>,
    submit_delay: Mutex<Option<Duration>>,
    submits: Mutex<Vec<Payload>>,
    cancels: Mutex<Vec<CancelTarget>>,
    listings: Mutex<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_submits(&self, failures: impl IntoIterator<Item = TransportFailure>) {
        self.submit_failures.lock().extend(failures);
    }

    pub fn fail_listings(&self, failures: impl IntoIterator<Item = TransportFailure>) {
        self.listing_failures.lock().extend(failures);
    }

    pub fn script_cancel(&self, response: TransportResult<Option<Payload>>) {
        self.cancel_responses.lock().push_back(response);
    }

    pub fn set_open_orders(&self, orders: Vec<Payload>) {
        *self.open_orders.lock() = orders;
    }

    /// Make every submit take `delay` of tokio time
    pub fn delay_submits(&self, delay: Duration) {
        *self.submit_delay.lock() = Some(delay);
    }

    pub fn submits(&self) -> Vec<Payload> {
        self.submits.lock().clone()
    }

    pub fn cancels(&self) -> Vec<CancelTarget> {
        self.cancels.lock().clone()
    }

    pub fn listings(&self) -> usize {
        *self.listings.lock()
    }
}

#[async_trait]
impl VenueTransport for ScriptedTransport {
    async fn submit_order(&self, request: &Payload) -> TransportResult<Payload> {
        let attempt = {
            let mut submits = self.submits.lock();
            submits.push(request.clone());
            submits.len()
        };
        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = self.submit_failures.lock().pop_front() {
            return Err(failure);
        }
        let mut response = request.clone();
        response.insert("id".into(), format!("venue-{}", attempt).into());
        response.insert("status".into(), "accepted".into());
        Ok(response)
    }

    async fn cancel_order(&self, target: &CancelTarget) -> TransportResult<Option<Payload>> {
        self.cancels.lock().push(target.clone());
        self.cancel_responses.lock().pop_front().unwrap_or(Ok(None))
    }

    async fn open_orders(&self) -> TransportResult<Vec<Payload>> {
        *self.listings.lock() += 1;
        if let Some(failure) = self.listing_failures.lock().pop_front() {
            return Err(failure);
        }
        Ok(self.open_orders.lock().clone())
    }
}

/// Sleeper that moves a [`ManualClock`] forward instead of waiting
pub struct ClockSleeper {
    clock: Arc<ManualClock>,
    delays: Mutex<Vec<Duration>>,
}

impl ClockSleeper {
    pub fn new(clock: Arc<ManualClock>) -> Arc<Self> {
        Arc::new(Self {
            clock,
            delays: Mutex::new(Vec::new()),
        })
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for ClockSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().push(delay);
        self.clock.advance(delay);
    }
}
