//! # Seeder
//!
//! Loads a small demo dataset for local development: two franchises, a
//! sub/drink/combo menu with zone prices, a weekday lunch special and a
//! pair of promotions.

use chrono::{NaiveTime, Weekday};
use thiserror::Error;
use tracing::info;

use crate::catalog::repository as catalog;
use crate::catalog::{CatalogError, ProductKind};
use crate::db::{Db, DbError};
use crate::orders::repository as orders;
use crate::orders::OrderError;
use crate::pricing::repository as pricing;
use crate::pricing::{PricingError, ZonePrice};
use crate::promotions::repository as promotions;
use crate::promotions::{
    BundleItem, NewPromotion, PromotionError, PromotionKind, PromotionScope,
};
use crate::types::{ServiceType, WeekdaySet, Zone};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Promotion(#[from] PromotionError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Populate the demo dataset. Intended for fresh databases; reruns fail
/// on unique names rather than duplicating data.
pub fn run(db: &Db) -> Result<(), SeedError> {
    db.with_tx(|tx| {
        orders::insert_franchise(tx, "CEN", "Centro")?;
        orders::insert_franchise(tx, "SUR", "Barrio Sur")?;

        // Menu: subs with two sizes, drinks, and a combo.
        let subs = catalog::insert_category(tx, "Subs")?;
        let drinks = catalog::insert_category(tx, "Drinks")?;
        let combos = catalog::insert_category(tx, "Combos")?;

        let italiano = catalog::insert_product(
            tx,
            subs.id,
            "Italiano",
            "Salami, ham and cheese",
            ProductKind::Simple,
        )?;
        let italiano_15 = catalog::insert_variant(tx, italiano.id, "15cm")?;
        let italiano_30 = catalog::insert_variant(tx, italiano.id, "30cm")?;

        let veggie = catalog::insert_product(
            tx,
            subs.id,
            "Veggie",
            "Grilled vegetables",
            ProductKind::Simple,
        )?;
        let veggie_15 = catalog::insert_variant(tx, veggie.id, "15cm")?;

        let soda = catalog::insert_product(tx, drinks.id, "Soda", "", ProductKind::Simple)?;
        let soda_500 = catalog::insert_variant(tx, soda.id, "500ml")?;

        let combo = catalog::insert_product(
            tx,
            combos.id,
            "Combo Personal",
            "Any 15cm sub with a drink",
            ProductKind::Combo,
        )?;
        let combo_base = catalog::insert_variant(tx, combo.id, "Standard")?;

        let sub_group = catalog::insert_group(tx, combo.id, "Sub")?;
        catalog::insert_option(tx, sub_group.id, italiano_15.id, 0)?;
        catalog::insert_option(tx, sub_group.id, veggie_15.id, 0)?;
        let drink_group = catalog::insert_group(tx, combo.id, "Drink")?;
        catalog::insert_option(tx, drink_group.id, soda_500.id, 0)?;

        // Zone prices: pickup and delivery in both zones, interior a
        // little higher on delivery.
        let price_table: &[(i64, i64)] = &[
            (italiano_15.id, 30_000),
            (italiano_30.id, 52_000),
            (veggie_15.id, 27_000),
            (soda_500.id, 8_000),
            (combo_base.id, 36_000),
        ];
        for (variant_id, base) in price_table {
            for zone in [Zone::Capital, Zone::Interior] {
                for service_type in [ServiceType::Pickup, ServiceType::Delivery] {
                    let mut price = *base;
                    if zone == Zone::Interior && service_type == ServiceType::Delivery {
                        price += 3_000;
                    }
                    pricing::upsert_zone_price(
                        tx,
                        &ZonePrice {
                            variant_id: *variant_id,
                            zone,
                            service_type,
                            price,
                        },
                    )?;
                }
            }
        }

        // Weekday lunch special on the veggie sub.
        pricing::insert_special(
            tx,
            veggie_15.id,
            21_000,
            WeekdaySet::from_days(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            NaiveTime::from_hms_opt(11, 0, 0).expect("valid time"),
            NaiveTime::from_hms_opt(14, 30, 0).expect("valid time"),
        )?;

        // Promotions: capital delivery percent cut and a sub+drink bundle.
        promotions::insert(
            tx,
            &NewPromotion {
                name: "Delivery Tuesdays".to_string(),
                kind: PromotionKind::PercentOff { percent: 10 },
                scope: PromotionScope::Categories(vec![subs.id]),
                zone: Some(Zone::Capital),
                service_type: Some(ServiceType::Delivery),
                weekdays: WeekdaySet::from_days(&[Weekday::Tue]),
                starts_at: None,
                ends_at: None,
                valid_from: None,
                valid_until: None,
            },
        )?;
        promotions::insert(
            tx,
            &NewPromotion {
                name: "Sub + Soda".to_string(),
                kind: PromotionKind::BundleSpecial {
                    items: vec![
                        BundleItem {
                            variant_id: italiano_15.id,
                            quantity: 1,
                        },
                        BundleItem {
                            variant_id: soda_500.id,
                            quantity: 1,
                        },
                    ],
                    bundle_price: 34_000,
                },
                scope: PromotionScope::All,
                zone: None,
                service_type: None,
                weekdays: WeekdaySet::all(),
                starts_at: None,
                ends_at: None,
                valid_from: None,
                valid_until: None,
            },
        )?;

        Ok::<_, SeedError>(())
    })?;

    info!("seeded demo dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_populates_menu() {
        let db = Db::open_in_memory().unwrap();
        run(&db).unwrap();

        let menu = db
            .with_conn::<_, CatalogError>(catalog::menu)
            .unwrap();
        assert_eq!(menu.len(), 3);
        assert!(menu.iter().any(|c| c.name == "Combos"));
    }

    #[test]
    fn test_seed_twice_fails_cleanly() {
        let db = Db::open_in_memory().unwrap();
        run(&db).unwrap();
        assert!(run(&db).is_err());
    }
}
