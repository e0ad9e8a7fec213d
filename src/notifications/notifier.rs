//! # Notifier
//!
//! Formats order-event messages and fans them out to a user's devices.
//! Delivery failures are logged and swallowed: a dead push must never
//! fail the checkout or transition that triggered it.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::db::Db;

use super::device;
use super::errors::NotifyResult;
use super::push::{PushClient, PushMessage, SendOutcome};

/// Order milestones customers get told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    Placed,
    Confirmed,
    Ready,
    Cancelled,
}

impl OrderEvent {
    fn title(&self) -> &'static str {
        match self {
            OrderEvent::Placed => "Order received",
            OrderEvent::Confirmed => "Order confirmed",
            OrderEvent::Ready => "Order ready",
            OrderEvent::Cancelled => "Order cancelled",
        }
    }

    fn body(&self, order_number: &str) -> String {
        match self {
            OrderEvent::Placed => format!("We got your order {order_number}."),
            OrderEvent::Confirmed => format!("Order {order_number} is being prepared."),
            OrderEvent::Ready => format!("Order {order_number} is ready for you."),
            OrderEvent::Cancelled => format!("Order {order_number} was cancelled."),
        }
    }
}

/// Build the push payload for an order event.
pub fn order_message(event: OrderEvent, order_number: &str) -> PushMessage {
    let mut data = HashMap::new();
    data.insert("order_number".to_string(), order_number.to_string());

    PushMessage {
        title: event.title().to_string(),
        body: event.body(order_number),
        data,
    }
}

pub struct Notifier<P: PushClient> {
    db: Db,
    client: P,
}

impl<P: PushClient> Notifier<P> {
    pub fn new(db: Db, client: P) -> Self {
        Self { db, client }
    }

    /// Send an order event to every device of a user. Dead tokens are
    /// pruned; other failures are logged per device and ignored.
    pub async fn notify_order_event(
        &self,
        user_id: Option<Uuid>,
        event: OrderEvent,
        order_number: &str,
    ) {
        let Some(user_id) = user_id else {
            return;
        };

        let tokens = match self.db.with_conn(|conn| device::tokens_for_user(conn, user_id)) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(%user_id, error = %e, "failed to load device tokens");
                return;
            }
        };

        let message = order_message(event, order_number);
        for token in tokens {
            match self.client.send(&token, &message).await {
                Ok(SendOutcome::Delivered) => {}
                Ok(SendOutcome::InvalidToken) => {
                    let _: NotifyResult<()> =
                        self.db.with_conn(|conn| device::prune(conn, &token));
                }
                Err(e) => {
                    warn!(order_number, error = %e, "push delivery failed");
                }
            }
        }
    }
}
