use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::db::{Achievement, AchievementWithStatus};
use crate::{AppState, Result};

#[derive(Debug, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
}

impl From<AchievementWithStatus> for AchievementStatus {
    fn from(row: AchievementWithStatus) -> Self {
        Self {
            earned: row.earned_at.is_some(),
            earned_at: row.earned_at,
            achievement: row.achievement,
        }
    }
}

pub async fn list_achievements(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let achievements: Vec<AchievementStatus> = state
        .db
        .achievements_with_status(user.id)
        .await?
        .into_iter()
        .map(AchievementStatus::from)
        .collect();
    let earned = achievements.iter().filter(|a| a.earned).count();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "achievements": achievements,
        "earned_count": earned,
        "total": achievements.len(),
    })))
}
