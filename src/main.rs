use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wordflow_server::config::CorsConfig;
use wordflow_server::{api, health_check, AppError, AppState, Settings};

const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(300);

fn build_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec!["Authorization", "Content-Type"])
        .max_age(config.max_age as usize)
}

/// Expired sessions and idle login windows are swept periodically.
fn spawn_maintenance(state: web::Data<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            interval.tick().await;

            match state.db.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!("Removed {} expired sessions", removed),
                Err(e) => error!("Session cleanup failed: {}", e),
            }
            state.login_limiter.cleanup().await;
        }
    });
}

#[actix_web::main]
async fn main() -> wordflow_server::Result<()> {
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new()?;
    info!("Configuration loaded ({})", config.environment);

    let state = AppState::new(config.clone()).await?;
    sqlx::migrate!("./migrations").run(state.db.pool()).await?;
    info!("Database migrations applied");

    let state = web::Data::new(state);
    spawn_maintenance(state.clone());

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&config.cors))
            .wrap(middleware::Logger::default())
            .app_data(server_state.clone())
            .route("/health", web::get().to(health_check))
            .configure(api::configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    state.shutdown().await?;
    info!("Server stopped");
    Ok(())
}
