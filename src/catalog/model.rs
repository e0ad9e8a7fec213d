//! # Catalog Models
//!
//! Categories hold products, products hold variants. A combo product
//! additionally carries choice groups whose options are interchangeable
//! variants, each with an optional surcharge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Money;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub position: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Combo,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Combo => "combo",
        }
    }
}

impl FromStr for ProductKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(ProductKind::Simple),
            "combo" => Ok(ProductKind::Combo),
            other => Err(format!("unknown product kind `{other}`")),
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub kind: ProductKind,
    pub position: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub position: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComboGroup {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub position: i64,
    pub options: Vec<ComboOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComboOption {
    pub group_id: i64,
    pub variant_id: i64,
    pub surcharge: Money,
}

// ==================
// Write payloads
// ==================

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_kind")]
    pub kind: ProductKind,
}

fn default_kind() -> ProductKind {
    ProductKind::Simple
}

#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewVariant {
    pub product_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewComboGroup {
    pub product_id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewComboOption {
    pub group_id: i64,
    pub variant_id: i64,
    #[serde(default)]
    pub surcharge: Money,
}

/// Full permutation of ids in their new display order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<i64>,
}

// ==================
// Menu read model
// ==================

/// What the storefront renders: active entries only, display order.
#[derive(Debug, Clone, Serialize)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub products: Vec<MenuProduct>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub kind: ProductKind,
    pub variants: Vec<MenuVariant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ComboGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuVariant {
    pub id: i64,
    pub name: String,
}
