mod client_order_id;
mod order;
mod order_type;
mod side;
mod time_in_force;

pub use client_order_id::ClientOrderId;
pub use order::OrderFields;
pub use order_type::OrderType;
pub use side::Side;
pub use time_in_force::TimeInForce;
