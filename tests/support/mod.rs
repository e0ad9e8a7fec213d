//! Shared fixtures for the integration suites: an in-memory database
//! with a small menu, zone prices and one franchise.

#![allow(dead_code)]

use comanda::auth::crypto::PasswordRules;
use comanda::auth::{user, Role, User};
use comanda::catalog::repository as catalog;
use comanda::catalog::{CatalogError, ProductKind};
use comanda::config::LoyaltyConfig;
use comanda::db::Db;
use comanda::orders::repository as orders;
use comanda::orders::{OrderError, OrderService};
use comanda::pricing::repository as pricing;
use comanda::pricing::{PricingError, ZonePrice};
use comanda::types::{ServiceType, Zone};
use uuid::Uuid;

pub const UTC_OFFSET: i32 = -180;

pub struct Fixture {
    pub db: Db,
    pub franchise_id: i64,
    pub subs_category_id: i64,
    pub italiano_product_id: i64,
    pub italiano_15: i64,
    pub italiano_30: i64,
    pub soda_500: i64,
    pub combo_product_id: i64,
    pub combo_base: i64,
    pub sub_group_id: i64,
    pub drink_group_id: i64,
}

/// Menu with prices in every zone/service combination:
/// italiano 15cm 30_000, 30cm 52_000, soda 8_000, combo base 36_000.
pub fn fixture() -> Fixture {
    let db = Db::open_in_memory().unwrap();

    let franchise_id = db
        .with_conn::<_, OrderError>(|conn| Ok(orders::insert_franchise(conn, "CEN", "Centro")?.id))
        .unwrap();

    let ids = db
        .with_conn::<_, CatalogError>(|conn| {
            let subs = catalog::insert_category(conn, "Subs")?;
            let drinks = catalog::insert_category(conn, "Drinks")?;
            let combos = catalog::insert_category(conn, "Combos")?;

            let italiano =
                catalog::insert_product(conn, subs.id, "Italiano", "", ProductKind::Simple)?;
            let italiano_15 = catalog::insert_variant(conn, italiano.id, "15cm")?;
            let italiano_30 = catalog::insert_variant(conn, italiano.id, "30cm")?;

            let soda = catalog::insert_product(conn, drinks.id, "Soda", "", ProductKind::Simple)?;
            let soda_500 = catalog::insert_variant(conn, soda.id, "500ml")?;

            let combo =
                catalog::insert_product(conn, combos.id, "Combo Personal", "", ProductKind::Combo)?;
            let combo_base = catalog::insert_variant(conn, combo.id, "Standard")?;
            let sub_group = catalog::insert_group(conn, combo.id, "Sub")?;
            catalog::insert_option(conn, sub_group.id, italiano_15.id, 0)?;
            let drink_group = catalog::insert_group(conn, combo.id, "Drink")?;
            catalog::insert_option(conn, drink_group.id, soda_500.id, 2_000)?;

            Ok((
                subs.id,
                italiano.id,
                italiano_15.id,
                italiano_30.id,
                soda_500.id,
                combo.id,
                combo_base.id,
                sub_group.id,
                drink_group.id,
            ))
        })
        .unwrap();

    let (
        subs_category_id,
        italiano_product_id,
        italiano_15,
        italiano_30,
        soda_500,
        combo_product_id,
        combo_base,
        sub_group_id,
        drink_group_id,
    ) = ids;

    db.with_conn::<_, PricingError>(|conn| {
        for (variant_id, price) in [
            (italiano_15, 30_000),
            (italiano_30, 52_000),
            (soda_500, 8_000),
            (combo_base, 36_000),
        ] {
            for zone in [Zone::Capital, Zone::Interior] {
                for service_type in [ServiceType::Pickup, ServiceType::Delivery] {
                    pricing::upsert_zone_price(
                        conn,
                        &ZonePrice {
                            variant_id,
                            zone,
                            service_type,
                            price,
                        },
                    )?;
                }
            }
        }
        Ok(())
    })
    .unwrap();

    Fixture {
        db,
        franchise_id,
        subs_category_id,
        italiano_product_id,
        italiano_15,
        italiano_30,
        soda_500,
        combo_product_id,
        combo_base,
        sub_group_id,
        drink_group_id,
    }
}

pub fn loyalty_config() -> LoyaltyConfig {
    LoyaltyConfig {
        accrual_divisor: 1_000,
        redemption_value: 50,
    }
}

pub fn order_service(db: &Db) -> OrderService {
    OrderService::new(db.clone(), loyalty_config(), UTC_OFFSET)
}

pub fn customer(db: &Db, email: &str) -> Uuid {
    let account = User::new_with_password(
        email.to_string(),
        "Test Customer".to_string(),
        Role::Customer,
        "password123",
        &PasswordRules::default(),
    )
    .unwrap();
    db.with_conn(|conn| user::insert(conn, &account)).unwrap();
    account.id
}
