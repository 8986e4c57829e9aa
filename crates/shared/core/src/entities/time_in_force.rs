use serde::{Deserialize, Serialize};

/// Time-in-force instructions for order validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Immediate or Cancel: execute immediately (partially or fully) and cancel unfilled portion
    IOC,

    /// Fill or Kill: execute immediately and completely, or cancel entire order
    FOK,

    /// Good Till Canceled: order remains active until explicitly canceled
    GTC,

    /// Day order: automatically canceled at end of trading day
    DAY,
}

impl TimeInForce {
    /// Lower-case wire word; venues that want upper case convert it themselves
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::IOC => "ioc",
            TimeInForce::FOK => "fok",
            TimeInForce::GTC => "gtc",
            TimeInForce::DAY => "day",
        }
    }
}
