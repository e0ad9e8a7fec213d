//! # Promotion Models
//!
//! A promotion is a discount rule with a kind (percent, amount, bundle),
//! a scope (which items it touches) and schedule/context constraints
//! (weekdays, time window, date range, zone, service type).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::catalog::VariantRef;
use crate::types::{window_covers, Money, ServiceType, WeekdaySet, Zone};

use super::errors::{PromotionError, PromotionResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionKind {
    /// Percent off the line subtotal, rounded down.
    PercentOff { percent: u8 },

    /// Fixed amount off the line subtotal, clamped at the subtotal.
    AmountOff { amount: Money },

    /// Fixed price for a fixed set of items, applied cart-wide when
    /// cheaper than their summed individual prices.
    BundleSpecial {
        items: Vec<BundleItem>,
        bundle_price: Money,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleItem {
    pub variant_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "ids", rename_all = "snake_case")]
pub enum PromotionScope {
    All,
    Products(Vec<i64>),
    Categories(Vec<i64>),
    Variants(Vec<i64>),
}

impl PromotionScope {
    pub fn covers(&self, variant: &VariantRef) -> bool {
        match self {
            PromotionScope::All => true,
            PromotionScope::Products(ids) => ids.contains(&variant.product_id),
            PromotionScope::Categories(ids) => ids.contains(&variant.category_id),
            PromotionScope::Variants(ids) => ids.contains(&variant.variant_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    pub kind: PromotionKind,
    pub scope: PromotionScope,

    /// Restricts to one zone; `None` applies everywhere.
    pub zone: Option<Zone>,
    /// Restricts to one service type; `None` applies to both.
    pub service_type: Option<ServiceType>,

    pub weekdays: WeekdaySet,
    pub starts_at: Option<NaiveTime>,
    pub ends_at: Option<NaiveTime>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub active: bool,
}

impl Promotion {
    /// Schedule check: weekday set, optional time window (midnight
    /// crossing allowed), optional inclusive date range.
    pub fn schedule_covers(&self, at: NaiveDateTime) -> bool {
        if !self.active {
            return false;
        }

        let date = at.date();
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if date > until {
                return false;
            }
        }

        match (self.starts_at, self.ends_at) {
            (Some(starts), Some(ends)) => window_covers(self.weekdays, starts, ends, at),
            // No time window: the weekday mask alone decides.
            _ => self.weekdays.contains(chrono::Datelike::weekday(&at)),
        }
    }

    /// Zone / service-type constraints, absent meaning "any".
    pub fn context_matches(&self, zone: Zone, service_type: ServiceType) -> bool {
        if let Some(required) = self.zone {
            if required != zone {
                return false;
            }
        }
        if let Some(required) = self.service_type {
            if required != service_type {
                return false;
            }
        }
        true
    }

    /// Discount this rule takes off a line subtotal. `None` for bundle
    /// specials, which are applied cart-wide instead.
    pub fn line_discount(&self, line_subtotal: Money) -> Option<Money> {
        match &self.kind {
            PromotionKind::PercentOff { percent } => {
                Some(line_subtotal * i64::from(*percent) / 100)
            }
            PromotionKind::AmountOff { amount } => Some((*amount).min(line_subtotal).max(0)),
            PromotionKind::BundleSpecial { .. } => None,
        }
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self.kind, PromotionKind::BundleSpecial { .. })
    }
}

/// Admin payload for creating a promotion.
#[derive(Debug, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    pub kind: PromotionKind,
    pub scope: PromotionScope,
    #[serde(default)]
    pub zone: Option<Zone>,
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    #[serde(default = "WeekdaySet::all")]
    pub weekdays: WeekdaySet,
    #[serde(default)]
    pub starts_at: Option<NaiveTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveTime>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

impl NewPromotion {
    pub fn validate(&self) -> PromotionResult<()> {
        match &self.kind {
            PromotionKind::PercentOff { percent } => {
                if *percent == 0 || *percent > 100 {
                    return Err(PromotionError::InvalidRule(
                        "percent must be between 1 and 100".to_string(),
                    ));
                }
            }
            PromotionKind::AmountOff { amount } => {
                if *amount <= 0 {
                    return Err(PromotionError::InvalidRule(
                        "amount must be positive".to_string(),
                    ));
                }
            }
            PromotionKind::BundleSpecial {
                items,
                bundle_price,
            } => {
                if items.is_empty() {
                    return Err(PromotionError::InvalidRule(
                        "bundle must list at least one item".to_string(),
                    ));
                }
                if items.iter().any(|item| item.quantity <= 0) {
                    return Err(PromotionError::InvalidRule(
                        "bundle quantities must be positive".to_string(),
                    ));
                }
                if *bundle_price < 0 {
                    return Err(PromotionError::InvalidRule(
                        "bundle price must not be negative".to_string(),
                    ));
                }
            }
        }

        if self.weekdays.is_empty() {
            return Err(PromotionError::InvalidRule(
                "weekday set must not be empty".to_string(),
            ));
        }
        if self.starts_at.is_some() != self.ends_at.is_some() {
            return Err(PromotionError::InvalidRule(
                "time window needs both starts_at and ends_at".to_string(),
            ));
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                return Err(PromotionError::InvalidRule(
                    "valid_from is after valid_until".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A line-level discount that was actually taken.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppliedPromotion {
    pub promotion_id: i64,
    pub name: String,
    pub amount: Money,
}
