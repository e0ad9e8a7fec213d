//! Promotion service: admin CRUD and eligibility lookups.

use chrono::NaiveDateTime;

use crate::db::Db;
use crate::types::{ServiceType, Zone};

use super::errors::PromotionResult;
use super::model::{NewPromotion, Promotion};
use super::repository as repo;

#[derive(Clone)]
pub struct PromotionService {
    db: Db,
}

impl PromotionService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewPromotion) -> PromotionResult<Promotion> {
        self.db.with_tx(|tx| repo::insert(tx, &new))
    }

    pub fn get(&self, id: i64) -> PromotionResult<Promotion> {
        self.db.with_conn(|conn| repo::get(conn, id))
    }

    pub fn list(&self) -> PromotionResult<Vec<Promotion>> {
        self.db.with_conn(repo::list)
    }

    pub fn set_active(&self, id: i64, active: bool) -> PromotionResult<()> {
        self.db.with_tx(|tx| repo::set_active(tx, id, active))
    }

    pub fn delete(&self, id: i64) -> PromotionResult<()> {
        self.db.with_tx(|tx| repo::delete(tx, id))
    }

    /// Promotions applicable right now for a zone/service context,
    /// newest first.
    pub fn eligible_at(
        &self,
        zone: Zone,
        service_type: ServiceType,
        at: NaiveDateTime,
    ) -> PromotionResult<Vec<Promotion>> {
        let mut promotions = self
            .db
            .with_conn(|conn| repo::eligible(conn, zone, service_type))?;
        promotions.retain(|p| p.schedule_covers(at));
        Ok(promotions)
    }
}
