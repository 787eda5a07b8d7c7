use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::api::parse_level;
use crate::auth::AuthenticatedUser;
use crate::{AppState, Result};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PhraseQuery {
    pub level: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub async fn list_phrases(
    _user: AuthenticatedUser,
    query: web::Query<PhraseQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Some(level) = query.level.as_deref() {
        parse_level(level)?;
    }

    let phrases = state
        .db
        .list_phrases(
            query.level.as_deref(),
            query.category.as_deref(),
            clamp_limit(query.limit),
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "phrases": phrases })))
}
