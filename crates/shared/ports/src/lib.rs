//! Aegis Ports
//!
//! Port definitions (traits) for the Aegis venue-adapter framework.
//! These define the boundaries between the adapter engine and the outside
//! world: time, delays, and the venue's RPC client.

mod clock;
mod error;
mod sleeper;
mod transport;

pub use clock::Clock;
pub use error::{TransportFailure, TransportResult};
pub use sleeper::Sleeper;
pub use transport::{CancelTarget, VenueTransport};
