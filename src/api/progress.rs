use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{parse_level, validate_mistake};
use crate::auth::AuthenticatedUser;
use crate::db::{Achievement, DbOperations};
use crate::error::AppError;
use crate::gamification::achievements::{completed_levels, newly_earned};
use crate::gamification::{apply_practice, apply_session, AchievementProgress, CefrLevel, UserStats};
use crate::{AppState, Result};

/// Largest session the client may report in one call.
pub const MAX_SESSION_QUESTIONS: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub level: Option<String>,
    pub category: Option<String>,
}

pub async fn list_progress(
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<ProgressQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Some(level) = query.level.as_deref() {
        parse_level(level)?;
    }

    let progress = state
        .db
        .list_progress(user.id, query.level.as_deref(), query.category.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "progress": progress })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub phrase_id: i32,
    pub correct: bool,
    pub mistake_type: Option<String>,
    pub user_answer: Option<String>,
}

/// Result of one graded answer, shared by phrase and file-word practice.
#[derive(Debug, Serialize)]
pub struct PracticeResponse {
    pub success: bool,
    pub xp_gained: i32,
    pub new_total_xp: i32,
    pub new_streak: i32,
    pub new_level: CefrLevel,
    pub level_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_milestone: Option<&'static str>,
    pub new_achievements: Vec<Achievement>,
}

pub async fn update_progress(
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<UpdateProgressRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    validate_mistake(req.mistake_type.as_deref(), req.user_answer.as_deref())?;

    let phrase = state
        .db
        .get_phrase(req.phrase_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Phrase not found".into()))?;

    let now = Utc::now();
    let mut tx = state.db.begin_transaction().await?;

    let progress = state
        .db
        .record_phrase_answer_with_transaction(&mut tx, user.id, phrase.id, req.correct, now)
        .await?;

    if !req.correct {
        if let Some(mistake_type) = req.mistake_type.as_deref() {
            state
                .db
                .record_mistake_with_transaction(
                    &mut tx,
                    user.id,
                    phrase.id,
                    mistake_type,
                    req.user_answer.as_deref(),
                )
                .await?;
        }
    }

    let response = record_practice(&state.db, &mut tx, user.id, req.correct, now).await?;
    tx.commit().await?;

    debug!(
        "User {} answered phrase {} (correct: {}, learned: {})",
        user.id, phrase.id, req.correct, progress.learned
    );
    Ok(HttpResponse::Ok().json(response))
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub bonus_xp: i32,
    pub perfect: bool,
    pub new_total_xp: i32,
    pub new_level: CefrLevel,
    pub level_up: bool,
    pub new_achievements: Vec<Achievement>,
}

pub(crate) fn validate_session(correct: u32, total: u32) -> Result<()> {
    if total == 0 || total > MAX_SESSION_QUESTIONS {
        return Err(AppError::ValidationError(format!(
            "Session must have between 1 and {} questions",
            MAX_SESSION_QUESTIONS
        )));
    }
    if correct > total {
        return Err(AppError::ValidationError(
            "Correct answers cannot exceed the number of questions".into(),
        ));
    }
    Ok(())
}

/// Applies the end-of-session bonuses once a learning session is finished.
pub async fn complete_session(
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<SessionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    validate_session(req.correct, req.total)?;

    let mut tx = state.db.begin_transaction().await?;
    let locked = state.db.lock_user_with_transaction(&mut tx, user.id).await?;
    let outcome = apply_session(&UserStats::from(&locked), req.correct, req.total);
    let updated = state
        .db
        .update_user_stats_with_transaction(&mut tx, user.id, &outcome.stats)
        .await?;
    let new_achievements = award_achievements(&state.db, &mut tx, user.id, &outcome.stats).await?;
    tx.commit().await?;

    info!(
        "User {} finished a session {}/{} (+{} XP)",
        user.id, req.correct, req.total, outcome.bonus_xp
    );

    Ok(HttpResponse::Ok().json(SessionResponse {
        bonus_xp: outcome.bonus_xp,
        perfect: outcome.perfect,
        new_total_xp: updated.total_xp,
        new_level: outcome.stats.current_level,
        level_up: outcome.level_up,
        new_achievements,
    }))
}

/// Grants XP, streak and daily progress for one answer and awards any
/// achievements it unlocks. The user row stays locked until the caller
/// commits `tx`.
pub(crate) async fn record_practice(
    db: &DbOperations,
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    correct: bool,
    now: DateTime<Utc>,
) -> Result<PracticeResponse> {
    let locked = db.lock_user_with_transaction(tx, user_id).await?;
    let outcome = apply_practice(&UserStats::from(&locked), correct, now);
    db.update_user_stats_with_transaction(tx, user_id, &outcome.stats)
        .await?;
    let new_achievements = award_achievements(db, tx, user_id, &outcome.stats).await?;

    if outcome.level_up {
        info!("User {} reached level {}", user_id, outcome.stats.current_level);
    }

    Ok(PracticeResponse {
        success: true,
        xp_gained: outcome.xp_gained,
        new_total_xp: outcome.stats.total_xp,
        new_streak: outcome.stats.streak,
        new_level: outcome.stats.current_level,
        level_up: outcome.level_up,
        streak_milestone: outcome.streak_milestone,
        new_achievements,
    })
}

async fn award_achievements(
    db: &DbOperations,
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    stats: &UserStats,
) -> Result<Vec<Achievement>> {
    let catalogue = db.achievements_with_transaction(tx).await?;
    let earned = db.earned_achievement_ids_with_transaction(tx, user_id).await?;
    let levels = db.level_summaries_with_transaction(tx, user_id).await?;

    let progress = AchievementProgress {
        learned_phrases: db.learned_phrases_with_transaction(tx, user_id).await?,
        streak: stats.streak,
        total_xp: stats.total_xp,
        completed_levels: completed_levels(&levels),
        perfect_streak: stats.perfect_streak,
    };

    let fresh: Vec<Achievement> = newly_earned(&catalogue, &earned, &progress)
        .into_iter()
        .cloned()
        .collect();

    for achievement in &fresh {
        db.grant_achievement_with_transaction(tx, user_id, achievement.id)
            .await?;
        info!("User {} earned achievement {}", user_id, achievement.name);
    }

    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session() {
        assert!(validate_session(10, 10).is_ok());
        assert!(validate_session(0, 5).is_ok());
        assert!(validate_session(0, 0).is_err());
        assert!(validate_session(6, 5).is_err());
        assert!(validate_session(1, MAX_SESSION_QUESTIONS + 1).is_err());
    }

    #[test]
    fn test_practice_response_omits_missing_milestone() {
        let response = PracticeResponse {
            success: true,
            xp_gained: 10,
            new_total_xp: 110,
            new_streak: 2,
            new_level: CefrLevel::A1,
            level_up: false,
            streak_milestone: None,
            new_achievements: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["new_level"], "A1");
        assert!(json.get("streak_milestone").is_none());
        assert_eq!(json["new_achievements"], serde_json::json!([]));
    }
}
