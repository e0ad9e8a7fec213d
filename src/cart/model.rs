//! # Cart Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::promotions::{AppliedBundle, AppliedPromotion};
use crate::types::{Money, ServiceType, Zone};

#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub zone: Zone,
    pub service_type: ServiceType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One pick inside a combo choice group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSelection {
    pub group_id: i64,
    pub variant_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    pub combo_selections: Vec<ComboSelection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartWithLines {
    #[serde(flatten)]
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
pub struct NewCart {
    pub zone: Zone,
    pub service_type: ServiceType,
}

#[derive(Debug, Deserialize)]
pub struct AddLine {
    pub variant_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub combo_selections: Vec<ComboSelection>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLine {
    /// Zero removes the line.
    pub quantity: i64,
}

/// Loyalty input to pricing: how many points the customer wants to burn
/// and what they are worth.
#[derive(Debug, Clone, Copy)]
pub struct LoyaltyContext {
    pub requested_points: i64,
    pub available_points: i64,
    /// Minor units of credit per point.
    pub redemption_value: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinePricing {
    pub line_id: i64,
    pub variant_id: i64,
    pub display_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_subtotal: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<AppliedPromotion>,
    pub daily_special: bool,
    pub line_total: Money,
}

/// Fully priced cart, deterministic for (cart, instant, loyalty input).
#[derive(Debug, Clone, Serialize)]
pub struct CartTotals {
    pub lines: Vec<LinePricing>,
    pub subtotal: Money,
    pub discount_total: Money,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<AppliedBundle>,
    pub loyalty_points_used: i64,
    pub loyalty_credit: Money,
    pub total: Money,
}
