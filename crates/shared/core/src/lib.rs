//! Aegis Core Domain
//!
//! Pure order domain types shared by every venue adapter.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{ClientOrderId, OrderFields, OrderType, Side, TimeInForce};
pub use values::{Payload, Price, Quantity, Symbol, Timestamp};
