//! # Pricing
//!
//! Zone pricing (capital/interior x pickup/delivery) and daily-special
//! overrides, resolved per variant by the price calculator.

pub mod calculator;
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

pub use errors::{PricingError, PricingResult};
pub use model::{DailySpecial, NewDailySpecial, Quote, QuoteSource, ZonePrice};
pub use service::PricingService;
