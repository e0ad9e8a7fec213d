//! Order numbers: per-franchise, per-local-day monotonic sequences.

mod support;

use chrono::{DateTime, TimeZone, Utc};
use comanda::cart::{AddLine, CartService, NewCart};
use comanda::orders::repository as orders_repo;
use comanda::orders::OrderError;
use comanda::types::{ServiceType, Zone};
use support::{fixture, order_service};

fn tuesday_noon_local() -> DateTime<Utc> {
    // 2026-08-04 15:00 UTC is 12:00 local at UTC-3.
    Utc.with_ymd_and_hms(2026, 8, 4, 15, 0, 0).unwrap()
}

fn place_order(
    f: &support::Fixture,
    franchise_id: i64,
    placed_at: DateTime<Utc>,
) -> comanda::orders::OrderWithLines {
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

    order_service(&f.db)
        .checkout(cart.id, franchise_id, 0, placed_at)
        .unwrap()
}

#[test]
fn numbers_are_sequential_within_a_franchise_day() {
    let f = fixture();

    let first = place_order(&f, f.franchise_id, tuesday_noon_local());
    let second = place_order(&f, f.franchise_id, tuesday_noon_local());
    let third = place_order(&f, f.franchise_id, tuesday_noon_local());

    assert_eq!(first.order.number, "CEN-20260804-0001");
    assert_eq!(second.order.number, "CEN-20260804-0002");
    assert_eq!(third.order.number, "CEN-20260804-0003");
    assert_eq!(third.order.seq, 3);
}

#[test]
fn each_franchise_counts_independently() {
    let f = fixture();
    let other = f
        .db
        .with_conn::<_, OrderError>(|conn| {
            Ok(orders_repo::insert_franchise(conn, "SUR", "Barrio Sur")?.id)
        })
        .unwrap();

    let central = place_order(&f, f.franchise_id, tuesday_noon_local());
    let southern = place_order(&f, other, tuesday_noon_local());

    assert_eq!(central.order.number, "CEN-20260804-0001");
    assert_eq!(southern.order.number, "SUR-20260804-0001");
}

#[test]
fn sequence_resets_at_local_midnight_not_utc() {
    let f = fixture();

    // 2026-08-05 01:00 UTC is still 2026-08-04 22:00 local.
    let late_evening = Utc.with_ymd_and_hms(2026, 8, 5, 1, 0, 0).unwrap();
    let first = place_order(&f, f.franchise_id, tuesday_noon_local());
    let second = place_order(&f, f.franchise_id, late_evening);

    assert_eq!(first.order.number, "CEN-20260804-0001");
    assert_eq!(second.order.number, "CEN-20260804-0002");

    // 2026-08-05 12:00 UTC is the next local day; the counter restarts.
    let next_day = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
    let third = place_order(&f, f.franchise_id, next_day);
    assert_eq!(third.order.number, "CEN-20260805-0001");
}

#[test]
fn duplicate_sequence_is_rejected_by_the_unique_index() {
    let f = fixture();
    place_order(&f, f.franchise_id, tuesday_noon_local());

    // Forcing the same (franchise, day, seq) violates the backstop index.
    let result = f.db.with_conn::<_, OrderError>(|conn| {
        conn.execute(
            "INSERT INTO orders (number, franchise_id, zone, service_type, status,
                                 subtotal, discount_total, loyalty_credit, total,
                                 local_date, seq, placed_at, updated_at)
             VALUES ('CEN-DUP', ?1, 'capital', 'pickup', 'pending',
                     0, 0, 0, 0, '2026-08-04', 1, 0, 0);",
            [f.franchise_id],
        )
        .map_err(OrderError::from)?;
        Ok(())
    });
    assert!(result.is_err());
}
