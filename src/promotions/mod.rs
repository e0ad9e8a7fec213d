//! # Promotions
//!
//! Discount rules: percent and amount line discounts plus cart-wide
//! bundle specials, constrained by scope, schedule, zone and service
//! type. Conflicts resolve first-match-wins, newest rule first.

pub mod errors;
pub mod matcher;
pub mod model;
pub mod repository;
pub mod service;

pub use errors::{PromotionError, PromotionResult};
pub use matcher::{AppliedBundle, LineContext};
pub use model::{
    AppliedPromotion, BundleItem, NewPromotion, Promotion, PromotionKind, PromotionScope,
};
pub use service::PromotionService;
