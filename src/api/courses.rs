use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::db::{CategorySummary, LevelSummary};
use crate::error::AppError;
use crate::gamification::CefrLevel;
use crate::{AppState, Result};

#[derive(Debug, Serialize, PartialEq)]
pub struct CourseSummary {
    pub level: CefrLevel,
    pub phrase_count: i64,
    pub learned_count: i64,
    pub percent: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryProgress {
    #[serde(flatten)]
    pub summary: CategorySummary,
    pub percent: i64,
}

pub(crate) fn percent(learned: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((learned as f64 / total as f64) * 100.0).round() as i64
}

/// One entry per CEFR level, including levels that have no phrases yet.
fn course_summaries(rows: &[LevelSummary]) -> Vec<CourseSummary> {
    CefrLevel::ALL
        .iter()
        .map(|level| {
            let (phrase_count, learned_count) = rows
                .iter()
                .find(|row| row.level == level.as_str())
                .map(|row| (row.phrase_count, row.learned_count))
                .unwrap_or((0, 0));
            CourseSummary {
                level: *level,
                phrase_count,
                learned_count,
                percent: percent(learned_count, phrase_count),
            }
        })
        .collect()
}

pub async fn list_courses(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let rows = state.db.level_summaries(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "courses": course_summaries(&rows),
        "current_level": user.level(),
    })))
}

pub async fn course_detail(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let level: CefrLevel = path
        .parse()
        .map_err(|_| AppError::NotFound("Level not found".into()))?;

    let categories: Vec<CategoryProgress> = state
        .db
        .category_summaries(user.id, level.as_str())
        .await?
        .into_iter()
        .map(|summary| CategoryProgress {
            percent: percent(summary.learned_count, summary.phrase_count),
            summary,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "level": level,
        "categories": categories,
    })))
}
