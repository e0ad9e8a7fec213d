//! comanda - restaurant ordering backend
//!
//! Menu management, zone pricing, promotions, carts, orders, loyalty
//! points, push notifications and admin permissions behind one HTTP API.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod http_server;
pub mod loyalty;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod promotions;
pub mod seed;
pub mod types;
