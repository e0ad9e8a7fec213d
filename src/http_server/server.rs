//! # HTTP Server
//!
//! Assembles every route module into one router and serves it with
//! CORS and graceful shutdown.

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::signal::{self, unix::SignalKind};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::admin_routes::admin_routes;
use super::auth_routes::auth_routes;
use super::cart_routes::cart_routes;
use super::catalog_routes::{catalog_routes, menu_routes};
use super::device_routes::device_routes;
use super::loyalty_routes::loyalty_routes;
use super::order_routes::order_routes;
use super::pricing_routes::pricing_routes;
use super::promotion_routes::promotion_routes;
use super::state::AppState;

pub struct HttpServer {
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the full router. Public for router-level tests.
    pub fn router(&self) -> Router {
        let cors = if self.state.config.http.cors_origins.is_empty() {
            // Development default
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = self
                .state
                .config
                .http
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        };

        let admin = Router::new()
            .nest("/catalog", catalog_routes(self.state.clone()))
            .nest("/pricing", pricing_routes(self.state.clone()))
            .nest("/promotions", promotion_routes(self.state.clone()))
            .merge(admin_routes(self.state.clone()));

        Router::new()
            .route("/health", get(health_handler))
            .nest("/auth", auth_routes(self.state.clone()))
            .nest("/menu", menu_routes(self.state.clone()))
            .nest("/carts", cart_routes(self.state.clone()))
            .nest("/orders", order_routes(self.state.clone()))
            .nest("/loyalty", loyalty_routes(self.state.clone()))
            .nest("/devices", device_routes(self.state.clone()))
            .nest("/admin", admin)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    pub async fn serve(self) -> Result<(), std::io::Error> {
        let address = self.state.config.socket_addr();
        let listener = TcpListener::bind(&address).await?;
        info!(%address, "server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("ctrl-c handler installs");
        info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(SignalKind::terminate())
            .expect("signal handler installs")
            .recv()
            .await;
        info!("received SIGTERM, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::Db;

    #[test]
    fn test_router_builds() {
        let state = Arc::new(AppState::new(
            AppConfig::default(),
            Db::open_in_memory().unwrap(),
        ));
        let _router = HttpServer::new(state).router();
    }
}
