use actix_web::web;
use sqlx::postgres::PgPoolOptions;
use wordflow_server::{AppState, Settings};

/// State backed by a lazy pool. Requests that are rejected before any query
/// runs never open a connection.
pub fn test_state_with(configure: impl FnOnce(&mut Settings)) -> web::Data<AppState> {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    configure(&mut config);
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to create lazy pool");
    web::Data::new(AppState::with_pool(config, pool).expect("Failed to build app state"))
}

#[allow(dead_code)]
pub fn test_state() -> web::Data<AppState> {
    test_state_with(|_| {})
}
