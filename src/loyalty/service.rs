//! Loyalty service: balances, statements, accrual math and manual
//! adjustments. Checkout-time movements run inside the order
//! transaction through the ledger functions directly.

use uuid::Uuid;

use crate::config::LoyaltyConfig;
use crate::db::Db;
use crate::types::Money;

use super::errors::LoyaltyResult;
use super::ledger::{self, LedgerEntry};

#[derive(Clone)]
pub struct LoyaltyService {
    db: Db,
    config: LoyaltyConfig,
}

impl LoyaltyService {
    pub fn new(db: Db, config: LoyaltyConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }

    /// Points earned for a paid total: one point per `accrual_divisor`
    /// minor units, floored.
    pub fn points_for(&self, total_paid: Money) -> i64 {
        if self.config.accrual_divisor <= 0 {
            return 0;
        }
        (total_paid / self.config.accrual_divisor).max(0)
    }

    pub fn balance(&self, user_id: Uuid) -> LoyaltyResult<i64> {
        self.db.with_conn(|conn| ledger::balance(conn, user_id))
    }

    pub fn statement(&self, user_id: Uuid, limit: u32) -> LoyaltyResult<Vec<LedgerEntry>> {
        self.db
            .with_conn(|conn| ledger::statement(conn, user_id, limit))
    }

    pub fn adjust(&self, user_id: Uuid, delta: i64, note: &str) -> LoyaltyResult<()> {
        self.db
            .with_tx(|tx| ledger::record_adjustment(tx, user_id, delta, note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::PasswordRules;
    use crate::auth::permissions::Role;
    use crate::auth::user::{self, User};
    use crate::loyalty::errors::LoyaltyError;

    fn setup() -> (Db, LoyaltyService, Uuid) {
        let db = Db::open_in_memory().unwrap();
        let account = User::new_with_password(
            "ana@example.com".to_string(),
            "Ana".to_string(),
            Role::Customer,
            "password123",
            &PasswordRules::default(),
        )
        .unwrap();
        db.with_conn(|conn| user::insert(conn, &account)).unwrap();

        let service = LoyaltyService::new(
            db.clone(),
            LoyaltyConfig {
                accrual_divisor: 1000,
                redemption_value: 50,
            },
        );
        (db, service, account.id)
    }

    #[test]
    fn test_points_for_floors() {
        let (_, service, _) = setup();
        assert_eq!(service.points_for(999), 0);
        assert_eq!(service.points_for(1000), 1);
        assert_eq!(service.points_for(45_900), 45);
    }

    #[test]
    fn test_balance_follows_ledger() {
        let (db, service, user_id) = setup();

        db.with_conn(|conn| ledger::record_accrual(conn, user_id, 40, 1))
            .unwrap();
        assert_eq!(service.balance(user_id).unwrap(), 40);

        db.with_conn(|conn| ledger::record_redemption(conn, user_id, 15, 2))
            .unwrap();
        assert_eq!(service.balance(user_id).unwrap(), 25);
    }

    #[test]
    fn test_redemption_cannot_exceed_balance() {
        let (db, service, user_id) = setup();

        db.with_conn(|conn| ledger::record_accrual(conn, user_id, 10, 1))
            .unwrap();

        let result = db.with_conn(|conn| ledger::record_redemption(conn, user_id, 11, 2));
        assert!(matches!(
            result,
            Err(LoyaltyError::InsufficientBalance {
                requested: 11,
                available: 10
            })
        ));
        assert_eq!(service.balance(user_id).unwrap(), 10);
    }

    #[test]
    fn test_adjustment_cannot_go_below_zero() {
        let (_, service, user_id) = setup();

        service.adjust(user_id, 30, "goodwill").unwrap();
        assert!(service.adjust(user_id, -31, "oops").is_err());
        service.adjust(user_id, -30, "correction").unwrap();
        assert_eq!(service.balance(user_id).unwrap(), 0);
    }

    #[test]
    fn test_statement_newest_first() {
        let (db, service, user_id) = setup();

        db.with_conn::<_, LoyaltyError>(|conn| {
            ledger::record_accrual(conn, user_id, 10, 1)?;
            ledger::record_accrual(conn, user_id, 20, 2)?;
            Ok(())
        })
        .unwrap();

        let entries = service.statement(user_id, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].delta, 20);
        assert_eq!(entries[1].delta, 10);
    }
}
