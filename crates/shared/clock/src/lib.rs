//! Aegis Clock Infrastructure
//!
//! Time and delay sources for the adapter engine:
//!
//! - [`SystemClock`] / [`TokioSleeper`] for production
//! - [`ManualClock`] / [`NoopSleeper`] / [`RecordingSleeper`] for deterministic tests
//!
//! ## Usage
//!
//! ```ignore
//! use aegis_clock::{ManualClock, Clock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_millis(1_010));
//! assert_eq!(clock.now() - start, Duration::from_millis(1_010));
//! ```

mod manual;
mod sleeper;
mod system;

pub use manual::ManualClock;
pub use sleeper::{NoopSleeper, RecordingSleeper, TokioSleeper};
pub use system::SystemClock;

// Re-export the ports for convenience
pub use aegis_ports::{Clock, Sleeper};
