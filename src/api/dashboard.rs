use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::db::User;
use crate::gamification::streak::{was_active_today, was_active_yesterday};
use crate::gamification::{daily_goal_percent, level_progress, CefrLevel, LevelProgress};
use crate::{AppState, Result};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub name: String,
    pub total_xp: i32,
    pub streak: i32,
    pub longest_streak: i32,
    pub learned_phrases: i64,
    pub total_phrases: i64,
    pub current_level: CefrLevel,
    pub level_progress: LevelProgress,
    pub daily_goal: i32,
    pub daily_progress: i32,
    pub daily_percent: u8,
}

impl Dashboard {
    /// Stored streak and daily counters are only brought up to date when the
    /// user practises, so stale values are zeroed here for display.
    pub fn build(user: &User, learned_phrases: i64, total_phrases: i64, now: DateTime<Utc>) -> Self {
        let active_today = was_active_today(user.last_active_at, now);
        let streak = if active_today || was_active_yesterday(user.last_active_at, now) {
            user.streak
        } else {
            0
        };
        let daily_progress = if active_today { user.daily_progress } else { 0 };

        Self {
            name: user.name.clone(),
            total_xp: user.total_xp,
            streak,
            longest_streak: user.longest_streak,
            learned_phrases,
            total_phrases,
            current_level: user.level(),
            level_progress: level_progress(user.total_xp),
            daily_goal: user.daily_goal,
            daily_progress,
            daily_percent: daily_goal_percent(daily_progress, user.daily_goal),
        }
    }
}

pub async fn dashboard(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let learned = state.db.count_learned_phrases(user.id).await?;
    let total = state.db.count_phrases().await?;

    Ok(HttpResponse::Ok().json(Dashboard::build(&user, learned, total, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn user() -> User {
        let mut user = User::new(
            "nino@example.ge".into(),
            "Nino".into(),
            "hash".into(),
            false,
        );
        user.total_xp = 1500;
        user.streak = 4;
        user.longest_streak = 9;
        user.daily_goal = 10;
        user.daily_progress = 6;
        user
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_active_today() {
        let mut user = user();
        user.last_active_at = Some(noon() - Duration::hours(3));

        let dashboard = Dashboard::build(&user, 12, 300, noon());
        assert_eq!(dashboard.streak, 4);
        assert_eq!(dashboard.daily_progress, 6);
        assert_eq!(dashboard.daily_percent, 60);
        assert_eq!(dashboard.learned_phrases, 12);
        assert_eq!(dashboard.level_progress.level, CefrLevel::A2);
    }

    #[test]
    fn test_active_yesterday_keeps_streak_but_resets_daily() {
        let mut user = user();
        user.last_active_at = Some(noon() - Duration::days(1));

        let dashboard = Dashboard::build(&user, 0, 0, noon());
        assert_eq!(dashboard.streak, 4);
        assert_eq!(dashboard.daily_progress, 0);
        assert_eq!(dashboard.daily_percent, 0);
    }

    #[test]
    fn test_lapsed_streak_shows_zero() {
        let mut user = user();
        user.last_active_at = Some(noon() - Duration::days(3));

        let dashboard = Dashboard::build(&user, 0, 0, noon());
        assert_eq!(dashboard.streak, 0);
        assert_eq!(dashboard.longest_streak, 9);
    }
}
