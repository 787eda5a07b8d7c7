//! Gamification rules: XP, CEFR levels, streaks, daily goals and achievements.
//!
//! Everything in here is pure. Callers load the current counters from the
//! database, run them through [`apply_practice`] or [`apply_session`] and
//! write the returned counters back.

pub mod achievements;
pub mod streak;
pub mod xp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::db::User;

pub use achievements::{AchievementKind, AchievementProgress, DEFAULT_ACHIEVEMENTS};
pub use streak::{calculate_new_streak, streak_milestone, StreakUpdate};
pub use xp::{calculate_session_xp, level_from_xp, level_progress, LevelProgress};

/// Correct answers needed before a phrase or file word counts as learned.
pub const LEARNED_THRESHOLD: i32 = 3;

/// CEFR proficiency level, ordered from beginner to mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for CefrLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CefrLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/// The per-user counters touched by practice.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub total_xp: i32,
    pub streak: i32,
    pub longest_streak: i32,
    pub daily_progress: i32,
    pub current_level: CefrLevel,
    pub perfect_sessions: i32,
    pub perfect_streak: i32,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        Self {
            total_xp: user.total_xp,
            streak: user.streak,
            longest_streak: user.longest_streak,
            daily_progress: user.daily_progress,
            current_level: user.level(),
            perfect_sessions: user.perfect_sessions,
            perfect_streak: user.perfect_streak,
            last_active_at: user.last_active_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PracticeOutcome {
    pub xp_gained: i32,
    pub stats: UserStats,
    pub level_up: bool,
    pub streak_milestone: Option<&'static str>,
}

/// Applies a single practice answer.
///
/// A correct answer earns [`xp::XP_CORRECT_ANSWER`] and counts towards the
/// daily goal. Any answer, right or wrong, keeps the streak alive. The stored
/// level only ever moves up.
pub fn apply_practice(stats: &UserStats, correct: bool, now: DateTime<Utc>) -> PracticeOutcome {
    let xp_gained = if correct { xp::XP_CORRECT_ANSWER } else { 0 };
    let StreakUpdate { streak, .. } = calculate_new_streak(stats.streak, stats.last_active_at, now);

    let daily_base = if streak::was_active_today(stats.last_active_at, now) {
        stats.daily_progress
    } else {
        0
    };

    let total_xp = stats.total_xp + xp_gained;
    let (current_level, level_up) = promote(stats.current_level, total_xp);

    let milestone = if streak != stats.streak {
        streak_milestone(streak)
    } else {
        None
    };

    PracticeOutcome {
        xp_gained,
        stats: UserStats {
            total_xp,
            streak,
            longest_streak: stats.longest_streak.max(streak),
            daily_progress: daily_base + i32::from(correct),
            current_level,
            perfect_sessions: stats.perfect_sessions,
            perfect_streak: stats.perfect_streak,
            last_active_at: Some(now),
        },
        level_up,
        streak_milestone: milestone,
    }
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub bonus_xp: i32,
    pub perfect: bool,
    pub stats: UserStats,
    pub level_up: bool,
}

/// Applies the end-of-session bonuses. Per-answer XP was already granted by
/// [`apply_practice`], so only the streak and perfect-session bonuses are added here.
pub fn apply_session(stats: &UserStats, correct: u32, total: u32) -> SessionOutcome {
    let perfect = total > 0 && correct == total;
    let bonus_xp = xp::session_bonus_xp(correct, total, stats.streak);
    let total_xp = stats.total_xp + bonus_xp;
    let (current_level, level_up) = promote(stats.current_level, total_xp);

    SessionOutcome {
        bonus_xp,
        perfect,
        stats: UserStats {
            total_xp,
            current_level,
            perfect_sessions: stats.perfect_sessions + i32::from(perfect),
            perfect_streak: if perfect { stats.perfect_streak + 1 } else { 0 },
            ..stats.clone()
        },
        level_up,
    }
}

fn promote(current: CefrLevel, total_xp: i32) -> (CefrLevel, bool) {
    let earned = level_from_xp(total_xp);
    if earned > current {
        (earned, true)
    } else {
        (current, false)
    }
}

/// Percentage of the daily goal reached, capped at 100.
pub fn daily_goal_percent(progress: i32, goal: i32) -> u8 {
    if goal <= 0 {
        return 100;
    }
    let percent = (progress.max(0) as f64 / goal as f64 * 100.0).round();
    percent.min(100.0) as u8
}
