//! Pricing service: admin CRUD plus quote lookups.

use chrono::NaiveDateTime;

use crate::db::Db;
use crate::types::{ServiceType, Zone};

use super::calculator;
use super::errors::PricingResult;
use super::model::{DailySpecial, NewDailySpecial, Quote, ZonePrice};
use super::repository as repo;

#[derive(Clone)]
pub struct PricingService {
    db: Db,
}

impl PricingService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn upsert_zone_price(&self, price: ZonePrice) -> PricingResult<()> {
        self.db.with_tx(|tx| repo::upsert_zone_price(tx, &price))
    }

    pub fn list_zone_prices(&self, variant_id: i64) -> PricingResult<Vec<ZonePrice>> {
        self.db.with_conn(|conn| repo::list_zone_prices(conn, variant_id))
    }

    pub fn create_special(&self, new: NewDailySpecial) -> PricingResult<DailySpecial> {
        self.db.with_tx(|tx| {
            repo::insert_special(
                tx,
                new.variant_id,
                new.special_price,
                new.weekdays,
                new.starts_at,
                new.ends_at,
            )
        })
    }

    pub fn list_specials(&self) -> PricingResult<Vec<DailySpecial>> {
        self.db.with_conn(repo::list_specials)
    }

    pub fn set_special_active(&self, id: i64, active: bool) -> PricingResult<()> {
        self.db.with_tx(|tx| repo::set_special_active(tx, id, active))
    }

    pub fn delete_special(&self, id: i64) -> PricingResult<()> {
        self.db.with_tx(|tx| repo::delete_special(tx, id))
    }

    pub fn quote(
        &self,
        variant_id: i64,
        zone: Zone,
        service_type: ServiceType,
        at: NaiveDateTime,
    ) -> PricingResult<Quote> {
        self.db
            .with_conn(|conn| calculator::quote(conn, variant_id, zone, service_type, at))
    }
}
