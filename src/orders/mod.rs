//! # Orders
//!
//! Checkout, per-franchise daily order numbers, the status lifecycle
//! and the admin activity feed.

pub mod errors;
pub mod model;
pub mod number;
pub mod repository;
pub mod service;

pub use errors::{OrderError, OrderResult};
pub use model::{
    ActivityEntry, ActivityKind, CheckoutRequest, Franchise, NewFranchise, Order, OrderLine,
    OrderStatus, OrderWithLines, TransitionRequest,
};
pub use service::OrderService;
