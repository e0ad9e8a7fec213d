//! # Loyalty
//!
//! Points ledger: accrual at checkout, checked redemption, manual
//! adjustments, balances and statements.

pub mod errors;
pub mod ledger;
pub mod service;

pub use errors::{LoyaltyError, LoyaltyResult};
pub use ledger::{LedgerEntry, LedgerReason};
pub use service::LoyaltyService;
