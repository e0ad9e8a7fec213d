//! # Price Calculator
//!
//! Resolves the unit price for a variant at an instant: an active daily
//! special covering the instant wins over the base zone price; a missing
//! zone price means the variant is not orderable there.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::types::{ServiceType, Zone};

use super::errors::{PricingError, PricingResult};
use super::model::{Quote, QuoteSource};
use super::repository as repo;

pub fn quote(
    conn: &Connection,
    variant_id: i64,
    zone: Zone,
    service_type: ServiceType,
    at: NaiveDateTime,
) -> PricingResult<Quote> {
    for special in repo::active_specials_for_variant(conn, variant_id)? {
        if special.covers(at) {
            return Ok(Quote {
                unit_price: special.special_price,
                source: QuoteSource::DailySpecial {
                    special_id: special.id,
                },
            });
        }
    }

    match repo::zone_price(conn, variant_id, zone, service_type)? {
        Some(price) => Ok(Quote {
            unit_price: price,
            source: QuoteSource::Base,
        }),
        None => Err(PricingError::NoPrice {
            variant_id,
            zone,
            service_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repository as catalog;
    use crate::catalog::ProductKind;
    use crate::db::Db;
    use crate::pricing::model::ZonePrice;
    use crate::types::WeekdaySet;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn monday_noon() -> NaiveDateTime {
        // 2026-08-03 is a Monday.
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn setup() -> (Db, i64) {
        let db = Db::open_in_memory().unwrap();
        let variant_id = db
            .with_conn::<_, crate::catalog::CatalogError>(|conn| {
                let category = catalog::insert_category(conn, "Subs")?;
                let product =
                    catalog::insert_product(conn, category.id, "Italiano", "", ProductKind::Simple)?;
                Ok(catalog::insert_variant(conn, product.id, "15cm")?.id)
            })
            .unwrap();

        db.with_conn::<_, PricingError>(|conn| {
            repo::upsert_zone_price(
                conn,
                &ZonePrice {
                    variant_id,
                    zone: Zone::Capital,
                    service_type: ServiceType::Pickup,
                    price: 30_000,
                },
            )
        })
        .unwrap();

        (db, variant_id)
    }

    #[test]
    fn test_base_price_when_no_special() {
        let (db, variant_id) = setup();

        let quoted = db
            .with_conn(|conn| {
                quote(conn, variant_id, Zone::Capital, ServiceType::Pickup, monday_noon())
            })
            .unwrap();
        assert_eq!(quoted.unit_price, 30_000);
        assert_eq!(quoted.source, QuoteSource::Base);
    }

    #[test]
    fn test_missing_zone_price_is_an_error() {
        let (db, variant_id) = setup();

        let result = db.with_conn(|conn| {
            quote(conn, variant_id, Zone::Interior, ServiceType::Delivery, monday_noon())
        });
        assert!(matches!(result, Err(PricingError::NoPrice { .. })));
    }

    #[test]
    fn test_special_overrides_base_inside_window() {
        let (db, variant_id) = setup();

        db.with_conn(|conn| {
            repo::insert_special(
                conn,
                variant_id,
                22_000,
                WeekdaySet::from_days(&[Weekday::Mon]),
                NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            )
        })
        .unwrap();

        let in_window = db
            .with_conn(|conn| {
                quote(conn, variant_id, Zone::Capital, ServiceType::Pickup, monday_noon())
            })
            .unwrap();
        assert_eq!(in_window.unit_price, 22_000);
        assert!(in_window.is_daily_special());

        // Outside the window the base price returns.
        let evening = NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let off_window = db
            .with_conn(|conn| {
                quote(conn, variant_id, Zone::Capital, ServiceType::Pickup, evening)
            })
            .unwrap();
        assert_eq!(off_window.unit_price, 30_000);
    }

    #[test]
    fn test_newest_special_wins_on_overlap() {
        let (db, variant_id) = setup();

        db.with_conn::<_, PricingError>(|conn| {
            repo::insert_special(
                conn,
                variant_id,
                25_000,
                WeekdaySet::all(),
                NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            )?;
            repo::insert_special(
                conn,
                variant_id,
                20_000,
                WeekdaySet::all(),
                NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            )?;
            Ok(())
        })
        .unwrap();

        let quoted = db
            .with_conn(|conn| {
                quote(conn, variant_id, Zone::Capital, ServiceType::Pickup, monday_noon())
            })
            .unwrap();
        assert_eq!(quoted.unit_price, 20_000);
    }
}
