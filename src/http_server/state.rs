//! Shared application state: one service per domain module over a
//! single database handle.

use crate::auth::crypto::PasswordRules;
use crate::auth::social::GoogleProvider;
use crate::auth::{AuthService, JwtConfig, JwtManager, SessionConfig};
use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::db::Db;
use crate::loyalty::LoyaltyService;
use crate::notifications::{HttpPushClient, Notifier};
use crate::orders::OrderService;
use crate::pricing::PricingService;
use crate::promotions::PromotionService;

pub struct AppState {
    pub config: AppConfig,
    pub db: Db,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub pricing: PricingService,
    pub promotions: PromotionService,
    pub carts: CartService,
    pub orders: OrderService,
    pub loyalty: LoyaltyService,
    pub notifier: Notifier<HttpPushClient>,
    pub google: GoogleProvider,
}

impl AppState {
    pub fn new(config: AppConfig, db: Db) -> Self {
        let jwt = JwtManager::new(JwtConfig {
            secret: config.auth.jwt_secret.clone(),
            access_ttl: chrono::Duration::minutes(config.auth.access_ttl_minutes),
        });
        let sessions = SessionConfig {
            refresh_ttl: chrono::Duration::days(config.auth.refresh_ttl_days),
        };
        let rules = PasswordRules {
            min_length: config.auth.password_min_length,
        };

        Self {
            auth: AuthService::new(db.clone(), jwt, sessions, rules),
            catalog: CatalogService::new(db.clone()),
            pricing: PricingService::new(db.clone()),
            promotions: PromotionService::new(db.clone()),
            carts: CartService::new(db.clone()),
            orders: OrderService::new(
                db.clone(),
                config.loyalty.clone(),
                config.utc_offset_minutes,
            ),
            loyalty: LoyaltyService::new(db.clone(), config.loyalty.clone()),
            notifier: Notifier::new(db.clone(), HttpPushClient::new(config.push.clone())),
            google: GoogleProvider::new(),
            db,
            config,
        }
    }
}
