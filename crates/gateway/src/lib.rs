//! Aegis Gateway
//!
//! Hardened venue adapters. Provides:
//! - Retry with exponential back-off and jitter ([`retry`])
//! - Sliding-window rate limiting ([`rate_limit`])
//! - Idempotent order submission keyed by client order id ([`idempotency`])
//! - Per-venue error classification ([`classifier`])
//! - Local-versus-venue reconciliation ([`reconcile`])
//!
//! ## Architecture
//!
//! ```text
//!        Order router
//!             │ submit_order / cancel_order / reconcile
//!    ┌────────▼────────┐
//!    │  VenueAdapter   │◄── VenueProfile (Alpaca, OANDA, CCXT)
//!    │ cache · limiter │
//!    │ retry · audit   │
//!    └────────┬────────┘
//!             │ VenueTransport (injected)
//!    ┌────────▼────────┐
//!    │   Venue RPC     │
//!    └─────────────────┘
//! ```
//!
//! Time and delays come in through the `Clock` and `Sleeper` ports, so tests
//! drive the limiter and the back-off without real waiting.

pub mod adapter;
pub mod audit;
pub mod cancel;
pub mod classifier;
pub mod error;
pub mod fingerprint;
pub mod idempotency;
pub mod rate_limit;
pub mod reconcile;
pub mod retry;
pub mod settings;
pub mod venues;

// Re-export commonly used types
pub use adapter::{AlpacaAdapter, CcxtAdapter, OandaAdapter, VenueAdapter, VenueAdapterBuilder};
pub use audit::{AuditAction, AuditLog, AuditRecord};
pub use cancel::CancelToken;
pub use classifier::{AttemptError, Classifier, classify_alpaca, classify_ccxt, classify_oanda};
pub use error::{AdapterError, ConfigError, FatalError, Result, RetryableError};
pub use fingerprint::PayloadFingerprint;
pub use idempotency::{CacheEntry, IdempotentOrderCache};
pub use rate_limit::{RateLimit, RateLimiter};
pub use reconcile::ReconciliationReport;
pub use retry::{RetryConfig, RetryPolicy, retry};
pub use settings::{AdapterSettings, RateLimitSettings, RetrySettings};
pub use venues::{AlpacaProfile, CcxtProfile, OandaProfile, VenueProfile};
