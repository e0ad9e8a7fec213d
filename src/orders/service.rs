//! # Order Service
//!
//! Checkout converts a cart into an order inside one immediate
//! transaction: re-price, number, snapshot lines, move loyalty points,
//! consume the cart. Any failure rolls the whole thing back.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::cart::{self, LoyaltyContext};
use crate::config::LoyaltyConfig;
use crate::db::Db;
use crate::loyalty::ledger;

use super::errors::{OrderError, OrderResult};
use super::model::{
    ActivityEntry, Franchise, Order, OrderStatus, OrderWithLines,
};
use super::number;
use super::repository as repo;

#[derive(Clone)]
pub struct OrderService {
    db: Db,
    loyalty: LoyaltyConfig,
    utc_offset_minutes: i32,
}

impl OrderService {
    pub fn new(db: Db, loyalty: LoyaltyConfig, utc_offset_minutes: i32) -> Self {
        Self {
            db,
            loyalty,
            utc_offset_minutes,
        }
    }

    /// Business-local wall clock for an instant; order-number days and
    /// schedule windows roll over at local midnight.
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveDateTime {
        (at + Duration::minutes(i64::from(self.utc_offset_minutes))).naive_utc()
    }

    pub fn checkout(
        &self,
        cart_id: Uuid,
        franchise_id: i64,
        redeem_points: i64,
        placed_at: DateTime<Utc>,
    ) -> OrderResult<OrderWithLines> {
        let local = self.local_time(placed_at);

        self.db.with_tx(|tx| {
            let cart = cart::repository::get(tx, cart_id).map_err(OrderError::Cart)?;
            if cart.lines.is_empty() {
                return Err(OrderError::EmptyCart);
            }

            let franchise = repo::get_franchise(tx, franchise_id)?;
            if !franchise.active {
                return Err(OrderError::FranchiseInactive(franchise_id));
            }

            let loyalty_ctx = match (cart.cart.user_id, redeem_points) {
                (Some(user_id), points) if points > 0 => {
                    let available = ledger::balance(tx, user_id)?;
                    Some(LoyaltyContext {
                        requested_points: points,
                        available_points: available,
                        redemption_value: self.loyalty.redemption_value,
                    })
                }
                _ => None,
            };

            let totals =
                cart::price_cart(tx, &cart, local, loyalty_ctx).map_err(OrderError::Cart)?;

            let (order_number, seq) =
                number::next(tx, franchise.id, &franchise.code, local.date())?;

            let order = Order {
                id: 0, // assigned by the insert
                number: order_number,
                franchise_id: franchise.id,
                user_id: cart.cart.user_id,
                zone: cart.cart.zone,
                service_type: cart.cart.service_type,
                status: OrderStatus::Pending,
                subtotal: totals.subtotal,
                discount_total: totals.discount_total,
                loyalty_credit: totals.loyalty_credit,
                total: totals.total,
                local_date: local.date(),
                seq,
                placed_at,
                updated_at: placed_at,
            };
            let order_id = repo::insert_order(tx, &order)?;

            for line in &totals.lines {
                repo::insert_line(
                    tx,
                    order_id,
                    &super::model::OrderLine {
                        id: 0,
                        order_id,
                        variant_id: line.variant_id,
                        display_name: line.display_name.clone(),
                        unit_price: line.unit_price,
                        quantity: line.quantity,
                        line_total: line.line_total,
                    },
                )?;
            }

            if let Some(user_id) = cart.cart.user_id {
                ledger::record_redemption(tx, user_id, totals.loyalty_points_used, order_id)?;

                let earned = if self.loyalty.accrual_divisor > 0 {
                    totals.total / self.loyalty.accrual_divisor
                } else {
                    0
                };
                ledger::record_accrual(tx, user_id, earned, order_id)?;
            }

            // The cart is consumed by the order.
            cart::repository::delete(tx, cart_id).map_err(OrderError::Cart)?;

            repo::get_order(tx, order_id)
        })
    }

    /// Move an order along its lifecycle; illegal moves are rejected and
    /// nothing is written.
    pub fn transition(
        &self,
        order_id: i64,
        to: OrderStatus,
        actor: Option<&str>,
    ) -> OrderResult<OrderWithLines> {
        self.db.with_tx(|tx| {
            let current = repo::get_order(tx, order_id)?;
            let from = current.order.status;

            if !from.can_transition_to(to) {
                return Err(OrderError::InvalidTransition { from, to });
            }

            repo::update_status(tx, order_id, to)?;
            repo::insert_event(tx, order_id, from, to, actor)?;
            repo::get_order(tx, order_id)
        })
    }

    pub fn get(&self, order_id: i64) -> OrderResult<OrderWithLines> {
        self.db.with_conn(|conn| repo::get_order(conn, order_id))
    }

    pub fn list(
        &self,
        franchise_id: i64,
        status: Option<OrderStatus>,
        limit: u32,
        offset: u32,
    ) -> OrderResult<Vec<Order>> {
        self.db
            .with_conn(|conn| repo::list_orders(conn, franchise_id, status, limit, offset))
    }

    pub fn list_for_user(&self, user_id: Uuid, limit: u32) -> OrderResult<Vec<Order>> {
        self.db
            .with_conn(|conn| repo::list_orders_for_user(conn, user_id, limit))
    }

    pub fn activity_feed(&self, limit: u32) -> OrderResult<Vec<ActivityEntry>> {
        self.db.with_conn(|conn| repo::activity_feed(conn, limit))
    }

    pub fn create_franchise(&self, code: &str, name: &str) -> OrderResult<Franchise> {
        self.db.with_tx(|tx| repo::insert_franchise(tx, code, name))
    }

    pub fn list_franchises(&self) -> OrderResult<Vec<Franchise>> {
        self.db.with_conn(repo::list_franchises)
    }

    pub fn set_franchise_active(&self, id: i64, active: bool) -> OrderResult<()> {
        self.db
            .with_tx(|tx| repo::set_franchise_active(tx, id, active))
    }

    /// Cart pricing preview for checkout screens, sharing the exact
    /// checkout code path.
    pub fn preview(
        &self,
        cart_id: Uuid,
        redeem_points: i64,
        at: DateTime<Utc>,
    ) -> OrderResult<crate::cart::CartTotals> {
        let local = self.local_time(at);
        self.db.with_conn(|conn| {
            let cart = cart::repository::get(conn, cart_id).map_err(OrderError::Cart)?;

            let loyalty_ctx = match (cart.cart.user_id, redeem_points) {
                (Some(user_id), points) if points > 0 => Some(LoyaltyContext {
                    requested_points: points,
                    available_points: ledger::balance(conn, user_id)?,
                    redemption_value: self.loyalty.redemption_value,
                }),
                _ => None,
            };

            cart::price_cart(conn, &cart, local, loyalty_ctx).map_err(OrderError::Cart)
        })
    }
}
