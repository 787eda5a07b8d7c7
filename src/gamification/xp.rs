use serde::Serialize;

use super::CefrLevel;

pub const XP_CORRECT_ANSWER: i32 = 10;
/// Granted per session once the streak reaches [`STREAK_BONUS_MIN_DAYS`].
pub const XP_STREAK_BONUS: i32 = 5;
pub const XP_PERFECT_SESSION: i32 = 25;

pub const STREAK_BONUS_MIN_DAYS: i32 = 7;

/// Lower bound (inclusive) and upper bound (exclusive) of each level's XP band.
const LEVEL_BANDS: [(CefrLevel, i32, i32); 6] = [
    (CefrLevel::A1, 0, 1000),
    (CefrLevel::A2, 1000, 2500),
    (CefrLevel::B1, 2500, 4500),
    (CefrLevel::B2, 4500, 7000),
    (CefrLevel::C1, 7000, 10000),
    (CefrLevel::C2, 10000, 15000),
];

/// Total XP for a finished session: per-answer XP plus bonuses.
pub fn calculate_session_xp(correct_answers: u32, total_questions: u32, current_streak: i32) -> i32 {
    correct_answers as i32 * XP_CORRECT_ANSWER
        + session_bonus_xp(correct_answers, total_questions, current_streak)
}

/// The bonus part of [`calculate_session_xp`].
pub fn session_bonus_xp(correct_answers: u32, total_questions: u32, current_streak: i32) -> i32 {
    let mut xp = 0;
    if current_streak >= STREAK_BONUS_MIN_DAYS {
        xp += XP_STREAK_BONUS;
    }
    if total_questions > 0 && correct_answers == total_questions {
        xp += XP_PERFECT_SESSION;
    }
    xp
}

pub fn level_from_xp(total_xp: i32) -> CefrLevel {
    match total_xp {
        xp if xp >= 10000 => CefrLevel::C2,
        xp if xp >= 7000 => CefrLevel::C1,
        xp if xp >= 4500 => CefrLevel::B2,
        xp if xp >= 2500 => CefrLevel::B1,
        xp if xp >= 1000 => CefrLevel::A2,
        _ => CefrLevel::A1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: CefrLevel,
    pub current: i32,
    pub max: i32,
    pub percent: f64,
}

/// Where `total_xp` sits inside its level band. XP past the top of the C2
/// band stays in C2 with `percent` capped at 100.
pub fn level_progress(total_xp: i32) -> LevelProgress {
    let (level, min, max) = LEVEL_BANDS
        .iter()
        .copied()
        .find(|(_, min, max)| total_xp >= *min && total_xp < *max)
        .unwrap_or(LEVEL_BANDS[LEVEL_BANDS.len() - 1]);

    let current = total_xp - min;
    let span = max - min;
    let percent = (current as f64 / span as f64 * 100.0).min(100.0);

    LevelProgress {
        level,
        current,
        max: span,
        percent,
    }
}
