pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod files;
pub mod games;
pub mod gamification;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, RateLimitConfig, RateLimiter};
pub use db::{DbOperations, User, UserSession};

use email::Mailer;
use storage::{BlobStore, ObjectBlobStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: DbOperations,
    pub auth_service: Arc<AuthService>,
    pub storage: Arc<dyn BlobStore>,
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database.url)
            .await
            .map_err(|e| AppError::DatabaseError(error::DatabaseError::ConnectionError(e.to_string())))?;

        Self::with_pool(config, pool)
    }

    /// Builds the state around an existing pool. The pool may be lazy, which
    /// lets tests exercise everything that fails before touching the database.
    pub fn with_pool(config: Settings, pool: PgPool) -> Result<Self> {
        let config = Arc::new(config);
        let db = DbOperations::new(Arc::new(pool));
        let mailer = Arc::new(Mailer::new(&config)?);
        let storage: Arc<dyn BlobStore> = Arc::new(ObjectBlobStore::from_settings(&config.storage)?);
        let auth_service = Arc::new(AuthService::new(db.clone(), config.clone(), mailer));
        let login_limiter = Arc::new(RateLimiter::new(RateLimitConfig::per_minute(
            config.auth.login_attempts_per_minute,
        )));

        Ok(Self {
            config,
            db,
            auth_service,
            storage,
            login_limiter,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db.pool().close().await;
        Ok(())
    }
}
