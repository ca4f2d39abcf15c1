//! Domain types and the ports the application layer talks through.

pub mod charge;
pub mod checkout;
pub mod order;
pub mod ports;
