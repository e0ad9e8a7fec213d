//! Checkout: atomic cart-to-order conversion with loyalty movements and
//! line snapshots.

mod support;

use chrono::{TimeZone, Utc};
use comanda::cart::{AddLine, CartError, CartService, ComboSelection, NewCart};
use comanda::catalog::repository as catalog;
use comanda::catalog::CatalogError;
use comanda::loyalty::{ledger, LoyaltyError};
use comanda::orders::OrderError;
use comanda::types::{ServiceType, Zone};
use support::{customer, fixture, order_service};

fn noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 4, 15, 0, 0).unwrap()
}

#[test]
fn checkout_snapshots_lines_and_consumes_the_cart() {
    let f = fixture();
    let carts = CartService::new(f.db.clone());

    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();
    carts
        .add_line(
            cart.id,
            AddLine {
                variant_id: f.italiano_15,
                quantity: 2,
                combo_selections: vec![],
            },
        )
        .unwrap();

    let placed = order_service(&f.db)
        .checkout(cart.id, f.franchise_id, 0, noon())
        .unwrap();

    assert_eq!(placed.order.subtotal, 60_000);
    assert_eq!(placed.order.total, 60_000);
    assert_eq!(placed.lines.len(), 1);
    assert_eq!(placed.lines[0].display_name, "Italiano 15cm");
    assert_eq!(placed.lines[0].quantity, 2);

    // The cart is gone.
    assert!(matches!(
        carts.get(cart.id),
        Err(CartError::NotFound(_))
    ));

    // Renaming the product later does not rewrite the snapshot.
    f.db.with_conn::<_, CatalogError>(|conn| {
        catalog::update_product(conn, f.italiano_product_id, Some("Renamed"), None, None)?;
        Ok(())
    })
    .unwrap();
    let reloaded = order_service(&f.db).get(placed.order.id).unwrap();
    assert_eq!(reloaded.lines[0].display_name, "Italiano 15cm");
}

#[test]
fn checkout_prices_combo_surcharges() {
    let f = fixture();
    let carts = CartService::new(f.db.clone());

    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();
    carts
        .add_line(
            cart.id,
            AddLine {
                variant_id: f.combo_base,
                quantity: 1,
                combo_selections: vec![
                    ComboSelection {
                        group_id: f.sub_group_id,
                        variant_id: f.italiano_15,
                    },
                    ComboSelection {
                        group_id: f.drink_group_id,
                        variant_id: f.soda_500,
                    },
                ],
            },
        )
        .unwrap();

    let placed = order_service(&f.db)
        .checkout(cart.id, f.franchise_id, 0, noon())
        .unwrap();

    // Combo base 36_000 plus the 2_000 drink surcharge.
    assert_eq!(placed.order.total, 38_000);
}

#[test]
fn checkout_moves_loyalty_points() {
    let f = fixture();
    let user_id = customer(&f.db, "ana@example.com");
    f.db.with_conn(|conn| ledger::record_accrual(conn, user_id, 100, 999))
        .unwrap();

    let carts = CartService::new(f.db.clone());
    let cart = carts
        .create(
            Some(user_id),
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();
    carts
        .add_line(
            cart.id,
            AddLine {
                variant_id: f.italiano_15,
                quantity: 1,
                combo_selections: vec![],
            },
        )
        .unwrap();

    // Redeem 40 points = 2_000 credit at 50/point.
    let placed = order_service(&f.db)
        .checkout(cart.id, f.franchise_id, 40, noon())
        .unwrap();

    assert_eq!(placed.order.loyalty_credit, 2_000);
    assert_eq!(placed.order.total, 28_000);

    // Balance: 100 - 40 redeemed + 28 accrued (28_000 / 1_000).
    let balance = f
        .db
        .with_conn::<_, LoyaltyError>(|conn| ledger::balance(conn, user_id))
        .unwrap();
    assert_eq!(balance, 88);
}

#[test]
fn anonymous_checkout_skips_loyalty() {
    let f = fixture();
    let carts = CartService::new(f.db.clone());
    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();
    carts
        .add_line(
            cart.id,
            AddLine {
                variant_id: f.soda_500,
                quantity: 1,
                combo_selections: vec![],
            },
        )
        .unwrap();

    // Requested points are ignored without an account on the cart.
    let placed = order_service(&f.db)
        .checkout(cart.id, f.franchise_id, 40, noon())
        .unwrap();
    assert_eq!(placed.order.loyalty_credit, 0);
    assert_eq!(placed.order.total, 8_000);
}

#[test]
fn empty_cart_cannot_check_out() {
    let f = fixture();
    let carts = CartService::new(f.db.clone());
    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();

    assert!(matches!(
        order_service(&f.db).checkout(cart.id, f.franchise_id, 0, noon()),
        Err(OrderError::EmptyCart)
    ));

    // Nothing was written, and the cart survives.
    assert!(carts.get(cart.id).is_ok());
    let orders: i64 = f
        .db
        .with_conn::<_, OrderError>(|conn| {
            conn.query_row("SELECT COUNT(*) FROM orders;", [], |row| row.get(0))
                .map_err(OrderError::from)
        })
        .unwrap();
    assert_eq!(orders, 0);
}

#[test]
fn inactive_franchise_rejects_orders() {
    let f = fixture();
    f.db.with_conn::<_, OrderError>(|conn| {
        comanda::orders::repository::set_franchise_active(conn, f.franchise_id, false)
    })
    .unwrap();

    let carts = CartService::new(f.db.clone());
    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();
    carts
        .add_line(
            cart.id,
            AddLine {
                variant_id: f.italiano_15,
                quantity: 1,
                combo_selections: vec![],
            },
        )
        .unwrap();

    assert!(matches!(
        order_service(&f.db).checkout(cart.id, f.franchise_id, 0, noon()),
        Err(OrderError::FranchiseInactive(_))
    ));
}

#[test]
fn combo_validation_rejects_bad_selections() {
    let f = fixture();
    let carts = CartService::new(f.db.clone());
    let cart = carts
        .create(
            None,
            NewCart {
                zone: Zone::Capital,
                service_type: ServiceType::Pickup,
            },
        )
        .unwrap();

    // Missing the drink group.
    let missing = carts.add_line(
        cart.id,
        AddLine {
            variant_id: f.combo_base,
            quantity: 1,
            combo_selections: vec![ComboSelection {
                group_id: f.sub_group_id,
                variant_id: f.italiano_15,
            }],
        },
    );
    assert!(matches!(missing, Err(CartError::InvalidComboSelection(_))));

    // A variant that is not an option of the group.
    let wrong_option = carts.add_line(
        cart.id,
        AddLine {
            variant_id: f.combo_base,
            quantity: 1,
            combo_selections: vec![
                ComboSelection {
                    group_id: f.sub_group_id,
                    variant_id: f.soda_500,
                },
                ComboSelection {
                    group_id: f.drink_group_id,
                    variant_id: f.soda_500,
                },
            ],
        },
    );
    assert!(matches!(
        wrong_option,
        Err(CartError::InvalidComboSelection(_))
    ));

    // Selections on a simple product.
    let simple_with_picks = carts.add_line(
        cart.id,
        AddLine {
            variant_id: f.italiano_15,
            quantity: 1,
            combo_selections: vec![ComboSelection {
                group_id: f.sub_group_id,
                variant_id: f.italiano_15,
            }],
        },
    );
    assert!(matches!(
        simple_with_picks,
        Err(CartError::InvalidComboSelection(_))
    ));
}
