// Route exports
pub mod auth;
pub mod events;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod volunteers;

use actix_web::web;
use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::core::Matcher;
use crate::services::{AuthGateway, CacheManager, DataStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<dyn AuthGateway>,
    pub cache: Arc<CacheManager>,
    pub matcher: Matcher,
    pub auth_config: AuthConfig,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure).service(
        web::scope("/api")
            .configure(events::configure)
            .configure(volunteers::configure)
            .configure(notifications::configure)
            .configure(reports::configure)
            .configure(auth::configure),
    );
}
