use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::wikimedia::commons::CommonsClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub commons: CommonsClient,
    pub limiter: Arc<RateLimiter>,
}
