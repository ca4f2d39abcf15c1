//! Application layer containing the checkout orchestration.
//!
//! `PaymentGateway` is the entry point for card submissions. It is composed
//! from settings, an order store, a processor and an availability policy, and
//! runs each submission as one linear validate, charge, record sequence.

pub mod availability;
pub mod gateway;
pub mod scripts;
