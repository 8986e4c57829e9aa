//! Generic venue adapter engine
//!
//! One engine, parameterised by a [`VenueProfile`], composes the retry
//! policy, the rate limiter, the idempotent order cache and the audit log
//! around an injected [`VenueTransport`].
//!
//! Submission flow:
//!
//! ```text
//! submit_order ─► build request ─► cache hit? ──yes──► cached response ─┐
//!                                      │ no                              │
//!                                      ▼                                 ▼
//!                   retry { rate limiter ─► transport } ─► cache ─► annotate
//!                                                                        │
//!                                                                   audit record
//! ```

use crate::audit::{AuditAction, AuditLog, AuditRecord};
use crate::cancel::CancelToken;
use crate::classifier::AttemptError;
use crate::error::{AdapterError, ConfigError, FatalError, Result};
use crate::idempotency::IdempotentOrderCache;
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::reconcile::ReconciliationReport;
use crate::retry::{RetryConfig, RetryPolicy};
use crate::settings::AdapterSettings;
use crate::venues::{AlpacaProfile, CcxtProfile, OandaProfile, VenueProfile};
use aegis_clock::{SystemClock, TokioSleeper};
use aegis_core::{ClientOrderId, OrderFields, Payload};
use aegis_ports::{Clock, Sleeper, TransportResult, VenueTransport};
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub type AlpacaAdapter = VenueAdapter<AlpacaProfile>;
pub type OandaAdapter = VenueAdapter<OandaProfile>;
pub type CcxtAdapter = VenueAdapter<CcxtProfile>;

/// Hardened adapter for one venue account
///
/// All state (cache, rate window, id counter, audit log) lives and dies with
/// the instance. Every method takes `&self`; share the adapter behind an
/// `Arc` to call it from several tasks.
pub struct VenueAdapter<P: VenueProfile> {
    profile: P,
    transport: Arc<dyn VenueTransport>,
    retry: RetryPolicy,
    limiter: RateLimiter,
    cache: IdempotentOrderCache,
    audit: AuditLog,
    sequence: AtomicU64,
}

impl<P: VenueProfile> VenueAdapter<P> {
    pub fn builder(profile: P, transport: Arc<dyn VenueTransport>) -> VenueAdapterBuilder<P> {
        VenueAdapterBuilder::new(profile, transport)
    }

    /// Adapter with default retry settings and the profile's rate limit
    pub fn new(profile: P, transport: Arc<dyn VenueTransport>) -> std::result::Result<Self, ConfigError> {
        Self::builder(profile, transport).build()
    }

    pub fn name(&self) -> &'static str {
        self.profile.name()
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    pub fn cache(&self) -> &IdempotentOrderCache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }

    /// Copy of the audit log, oldest record first
    pub fn audit_log(&self) -> Vec<AuditRecord> {
        self.audit.records()
    }

    fn next_client_id(&self) -> ClientOrderId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        ClientOrderId::generated(self.profile.name(), sequence)
    }

    /// Submit an order at most once per client id
    ///
    /// Without `client_id` a fresh `{venue}-{n:06}` id is generated. A repeat
    /// with the same id and an identical request returns the cached response
    /// without touching the rate limiter or the network; a repeat with a
    /// different request fails with [`FatalError::OrderConflict`].
    pub async fn submit_order(
        &self,
        order: OrderFields,
        client_id: Option<ClientOrderId>,
    ) -> Result<Payload> {
        if !order.validate() {
            return Err(FatalError::InvalidOrder(format!(
                "{} {} order for {} {} is missing a required price or quantity",
                order.side.as_str(),
                order.order_type.as_str(),
                order.quantity,
                order.symbol
            ))
            .into());
        }

        let id = client_id.unwrap_or_else(|| self.next_client_id());
        let request = self.profile.build_request(&id, &order)?;

        let mut response = self
            .cache
            .remember(&id, &request, || async {
                let mut response = self
                    .call(|| self.transport.submit_order(&request))
                    .await?;
                // Cancels read the venue ids back out of the cached response
                self.profile.annotate_response(&id, &request, &mut response);
                info!("[{}] Order {} accepted", self.profile.name(), id);
                Ok::<_, AdapterError>(response)
            })
            .await?;
        // A cancel may have replaced the cached response since
        self.profile.annotate_response(&id, &request, &mut response);

        self.audit.append(
            AuditAction::SubmitOrder,
            self.profile.submit_audit_payload(&id, &request),
            Value::Object(response.clone()),
        );
        Ok(response)
    }

    /// Cancel a previously submitted order
    ///
    /// The id must already be cached (a submission still in flight does not
    /// count); otherwise [`FatalError::UnknownClientId`] is returned and the
    /// venue is never contacted.
    pub async fn cancel_order(&self, client_id: &ClientOrderId) -> Result<Payload> {
        let cached = self
            .cache
            .get(client_id)
            .ok_or_else(|| FatalError::UnknownClientId(client_id.clone()))?;
        let target = self.profile.cancel_target(client_id, &cached)?;

        let raw = self.call(|| self.transport.cancel_order(&target)).await?;
        let response = self.profile.cancel_response(&target, raw);

        self.cache.update(client_id, response.clone());
        self.audit.append(
            AuditAction::CancelOrder,
            self.profile.cancel_audit_payload(&target),
            Value::Object(response.clone()),
        );
        info!("[{}] Order {} cancelled", self.profile.name(), client_id);
        Ok(response)
    }

    /// Diff the locally cached ids against the venue's open orders
    ///
    /// Fetch failures that survive the retry loop degrade to an empty remote
    /// set. Only cancellation is returned as an error.
    pub async fn reconcile(&self) -> Result<ReconciliationReport> {
        let remote_orders = match self.call(|| self.transport.open_orders()).await {
            Ok(orders) => orders,
            Err(AdapterError::Cancelled) => return Err(AdapterError::Cancelled),
            Err(error) => {
                warn!(
                    "[{}] Reconciliation fetch failed, treating remote as empty: {}",
                    self.profile.name(),
                    error
                );
                Vec::new()
            }
        };

        let remote: Vec<String> = remote_orders
            .iter()
            .filter_map(|order| self.profile.remote_client_id(order))
            .collect();
        let local = self.cache.keys().into_iter().map(ClientOrderId::into_inner);
        let report = ReconciliationReport::diff(local, remote);

        debug!(
            "[{}] Reconciled: {} missing remote, {} untracked remote",
            self.profile.name(),
            report.missing_remote.len(),
            report.untracked_remote.len()
        );
        self.audit.append(
            AuditAction::Reconcile,
            Payload::new(),
            json!({
                "missing_remote": report.missing_remote,
                "untracked_remote": report.untracked_remote,
            }),
        );
        Ok(report)
    }

    /// Run a transport call under the rate limiter and the retry policy
    ///
    /// A permit is taken per attempt, so a rate-limit rejection is just
    /// another retryable failure.
    async fn call<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let classifier = self.profile.classifier();
        self.retry
            .run(
                || {
                    let admitted = self.limiter.acquire();
                    let attempt = operation();
                    async move {
                        if let Err(limited) = admitted {
                            return Err(AttemptError::from(limited));
                        }
                        attempt.await.map_err(AttemptError::from)
                    }
                },
                |error: AttemptError| error.classify(classifier),
            )
            .await
    }
}

/// Builder for [`VenueAdapter`]
pub struct VenueAdapterBuilder<P: VenueProfile> {
    profile: P,
    transport: Arc<dyn VenueTransport>,
    retry: RetryConfig,
    rate_limit: Option<RateLimit>,
    clock: Option<Arc<dyn Clock>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    cancel: Option<CancelToken>,
    invalid: Option<ConfigError>,
}

impl<P: VenueProfile> VenueAdapterBuilder<P> {
    pub fn new(profile: P, transport: Arc<dyn VenueTransport>) -> Self {
        Self {
            profile,
            transport,
            retry: RetryConfig::default(),
            rate_limit: None,
            clock: None,
            sleeper: None,
            cancel: None,
            invalid: None,
        }
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    pub fn rate_limit(mut self, max_calls: usize, period: Duration) -> Self {
        self.rate_limit = Some(RateLimit::new(max_calls, period));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Apply loaded settings; invalid values are reported by [`Self::build`]
    pub fn settings(mut self, settings: &AdapterSettings) -> Self {
        match settings.retry_config() {
            Ok(config) => self.retry = config,
            Err(error) => {
                self.invalid.get_or_insert(error);
            }
        }
        match settings.rate_limit() {
            Ok(Some(limit)) => self.rate_limit = Some(limit),
            Ok(None) => {}
            Err(error) => {
                self.invalid.get_or_insert(error);
            }
        }
        self
    }

    pub fn build(self) -> std::result::Result<VenueAdapter<P>, ConfigError> {
        if let Some(error) = self.invalid {
            return Err(error);
        }
        self.retry.validate()?;

        let limit = self
            .rate_limit
            .unwrap_or_else(|| self.profile.default_rate_limit());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let limiter = RateLimiter::from_limit(limit, clock)?;

        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));
        let mut retry = RetryPolicy::new(self.retry, sleeper);
        if let Some(token) = self.cancel {
            retry = retry.with_cancel_token(token);
        }

        debug!(
            "[{}] Adapter built: {:?}, {} calls per {:?}",
            self.profile.name(),
            self.retry,
            limit.max_calls,
            limit.period
        );

        Ok(VenueAdapter {
            profile: self.profile,
            transport: self.transport,
            retry,
            limiter,
            cache: IdempotentOrderCache::new(),
            audit: AuditLog::new(),
            sequence: AtomicU64::new(0),
        })
    }
}
