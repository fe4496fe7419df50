//! exrate Common Types
//!
//! This crate contains shared types used across the exrate workspace,
//! including the ISO 4217 currency table, rate sides, the persisted rate
//! record and feed date handling.

pub mod currency;
pub mod rate;
pub mod error;
pub mod time;

pub use currency::*;
pub use rate::*;
pub use error::*;
pub use time::*;
