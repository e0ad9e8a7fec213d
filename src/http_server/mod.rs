//! # HTTP Server
//!
//! axum routers per resource over the shared [`state::AppState`], with
//! bearer-token auth, permission-gated admin routes, and a uniform
//! `{error, code}` error body.

pub mod admin_routes;
pub mod auth_routes;
pub mod cart_routes;
pub mod catalog_routes;
pub mod device_routes;
pub mod error;
pub mod extract;
pub mod loyalty_routes;
pub mod order_routes;
pub mod pricing_routes;
pub mod promotion_routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::HttpServer;
pub use state::AppState;
