//! # Cart Service
//!
//! Line validation and the totals pipeline: base quotes, line
//! promotions, bundle specials, loyalty credit.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::catalog::repository as catalog;
use crate::catalog::ProductKind;
use crate::db::Db;
use crate::pricing::calculator;
use crate::promotions::matcher::{self, LineContext};
use crate::promotions::repository as promotions;
use crate::promotions::Promotion;

use super::errors::{CartError, CartResult};
use super::model::{
    AddLine, Cart, CartLine, CartTotals, CartWithLines, ComboSelection, LinePricing,
    LoyaltyContext, NewCart,
};
use super::repository as repo;

#[derive(Clone)]
pub struct CartService {
    db: Db,
}

impl CartService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create(&self, user_id: Option<Uuid>, new: NewCart) -> CartResult<Cart> {
        self.db
            .with_tx(|tx| repo::create(tx, user_id, new.zone, new.service_type))
    }

    pub fn get(&self, id: Uuid) -> CartResult<CartWithLines> {
        self.db.with_conn(|conn| repo::get(conn, id))
    }

    pub fn add_line(&self, cart_id: Uuid, add: AddLine) -> CartResult<CartLine> {
        if add.quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        self.db.with_tx(|tx| {
            // Cart must exist.
            repo::get(tx, cart_id)?;
            validate_line(tx, add.variant_id, &add.combo_selections)?;
            repo::add_line(tx, cart_id, add.variant_id, add.quantity, &add.combo_selections)
        })
    }

    pub fn set_line_quantity(&self, cart_id: Uuid, line_id: i64, quantity: i64) -> CartResult<()> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        self.db
            .with_tx(|tx| repo::set_line_quantity(tx, cart_id, line_id, quantity))
    }

    pub fn remove_line(&self, cart_id: Uuid, line_id: i64) -> CartResult<()> {
        self.db.with_tx(|tx| repo::remove_line(tx, cart_id, line_id))
    }

    /// Price the cart at a local instant.
    pub fn price(
        &self,
        cart_id: Uuid,
        at: NaiveDateTime,
        loyalty: Option<LoyaltyContext>,
    ) -> CartResult<CartTotals> {
        self.db.with_conn(|conn| {
            let cart = repo::get(conn, cart_id)?;
            price_cart(conn, &cart, at, loyalty)
        })
    }
}

/// Validate a prospective line: the variant chain must be active, and a
/// combo line must pick exactly one option from each of its groups.
pub fn validate_line(
    conn: &Connection,
    variant_id: i64,
    selections: &[ComboSelection],
) -> CartResult<()> {
    let variant = catalog::resolve_variant(conn, variant_id)?;
    if !variant.active {
        return Err(CartError::VariantUnavailable(variant_id));
    }

    match variant.kind {
        ProductKind::Simple => {
            if !selections.is_empty() {
                return Err(CartError::InvalidComboSelection(
                    "selections given for a non-combo product".to_string(),
                ));
            }
        }
        ProductKind::Combo => {
            let groups = catalog::list_groups(conn, variant.product_id)?;

            for group in &groups {
                let picks: Vec<_> = selections
                    .iter()
                    .filter(|s| s.group_id == group.id)
                    .collect();
                if picks.len() != 1 {
                    return Err(CartError::InvalidComboSelection(format!(
                        "group `{}` needs exactly one pick",
                        group.name
                    )));
                }
                let pick = picks[0];
                if !group.options.iter().any(|o| o.variant_id == pick.variant_id) {
                    return Err(CartError::InvalidComboSelection(format!(
                        "variant {} is not an option of group `{}`",
                        pick.variant_id, group.name
                    )));
                }
                // The chosen option must itself be orderable.
                let option_variant = catalog::resolve_variant(conn, pick.variant_id)?;
                if !option_variant.active {
                    return Err(CartError::VariantUnavailable(pick.variant_id));
                }
            }

            let known: Vec<i64> = groups.iter().map(|g| g.id).collect();
            if let Some(stray) = selections.iter().find(|s| !known.contains(&s.group_id)) {
                return Err(CartError::InvalidComboSelection(format!(
                    "group {} does not belong to this combo",
                    stray.group_id
                )));
            }
        }
    }

    Ok(())
}

/// Price a loaded cart. Pure over the connection: callers pick the
/// transaction boundary (checkout runs this inside its own).
pub fn price_cart(
    conn: &Connection,
    cart: &CartWithLines,
    at: NaiveDateTime,
    loyalty: Option<LoyaltyContext>,
) -> CartResult<CartTotals> {
    let eligible: Vec<Promotion> = {
        let mut promotions =
            promotions::eligible(conn, cart.cart.zone, cart.cart.service_type)?;
        promotions.retain(|p| p.schedule_covers(at));
        promotions
    };

    // Base quotes per line.
    let mut contexts = Vec::with_capacity(cart.lines.len());
    for line in &cart.lines {
        let variant = catalog::resolve_variant(conn, line.variant_id)?;
        if !variant.active {
            return Err(CartError::VariantUnavailable(line.variant_id));
        }

        let quote = calculator::quote(
            conn,
            line.variant_id,
            cart.cart.zone,
            cart.cart.service_type,
            at,
        )?;

        let mut unit_price = quote.unit_price;
        for selection in &line.combo_selections {
            let surcharge = catalog::option_surcharge(conn, selection.group_id, selection.variant_id)?
                .ok_or_else(|| {
                    CartError::InvalidComboSelection(format!(
                        "variant {} is not an option of group {}",
                        selection.variant_id, selection.group_id
                    ))
                })?;
            unit_price += surcharge;
        }

        contexts.push(LineContext {
            line_id: line.id,
            variant,
            quantity: line.quantity,
            unit_price,
            line_subtotal: unit_price * line.quantity,
            daily_special: quote.is_daily_special(),
        });
    }

    // Line discounts: first match wins, daily specials abstain.
    let mut lines = Vec::with_capacity(contexts.len());
    let mut subtotal = 0;
    let mut discount_total = 0;
    let mut undiscounted = Vec::new();

    for context in &contexts {
        let promotion = matcher::best_line_discount(&eligible, context);
        let discount = promotion.as_ref().map(|p| p.amount).unwrap_or(0);

        if promotion.is_none() && !context.daily_special {
            undiscounted.push(context.clone());
        }

        subtotal += context.line_subtotal;
        discount_total += discount;

        lines.push(LinePricing {
            line_id: context.line_id,
            variant_id: context.variant.variant_id,
            display_name: context.variant.display_name.clone(),
            quantity: context.quantity,
            unit_price: context.unit_price,
            line_subtotal: context.line_subtotal,
            promotion,
            daily_special: context.daily_special,
            line_total: context.line_subtotal - discount,
        });
    }

    // Bundle specials over the lines that kept their base price.
    let bundles = matcher::apply_bundles(&eligible, &undiscounted);
    for bundle in &bundles {
        discount_total += bundle.saving;
    }

    // Loyalty credit, capped at the balance and the payable remainder.
    let payable = (subtotal - discount_total).max(0);
    let (loyalty_points_used, loyalty_credit) = match loyalty {
        Some(ctx) if ctx.redemption_value > 0 => {
            let mut points = ctx.requested_points.max(0).min(ctx.available_points.max(0));
            if points * ctx.redemption_value > payable {
                points = payable / ctx.redemption_value;
            }
            (points, points * ctx.redemption_value)
        }
        _ => (0, 0),
    };

    Ok(CartTotals {
        lines,
        subtotal,
        discount_total,
        bundles,
        loyalty_points_used,
        loyalty_credit,
        total: (payable - loyalty_credit).max(0),
    })
}
