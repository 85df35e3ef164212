//! Core domain types and logic.

pub mod error;
pub mod forecast;
pub mod metrics;
pub mod price;
