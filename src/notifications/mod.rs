//! # Notifications
//!
//! FCM device registry and push delivery for order events.

pub mod device;
pub mod errors;
pub mod notifier;
pub mod push;

pub use device::{Device, Platform, RegisterDevice};
pub use errors::{NotifyError, NotifyResult};
pub use notifier::{order_message, Notifier, OrderEvent};
pub use push::{HttpPushClient, MockPushClient, PushClient, PushMessage, SendOutcome};
