use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: i32,
    pub streak_broken: bool,
}

fn activity_day(last_active_at: Option<DateTime<Utc>>) -> Option<NaiveDate> {
    last_active_at.map(|ts| ts.date_naive())
}

pub fn was_active_today(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    activity_day(last_active_at) == Some(now.date_naive())
}

pub fn was_active_yesterday(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match (activity_day(last_active_at), now.date_naive().pred_opt()) {
        (Some(day), Some(yesterday)) => day == yesterday,
        _ => false,
    }
}

/// Streak after an activity at `now`. Days are UTC calendar days.
pub fn calculate_new_streak(
    current_streak: i32,
    last_active_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StreakUpdate {
    if was_active_today(last_active_at, now) {
        return StreakUpdate {
            streak: current_streak,
            streak_broken: false,
        };
    }

    if was_active_yesterday(last_active_at, now) {
        return StreakUpdate {
            streak: current_streak + 1,
            streak_broken: false,
        };
    }

    StreakUpdate {
        streak: 1,
        streak_broken: current_streak > 0,
    }
}

pub fn streak_milestone(streak: i32) -> Option<&'static str> {
    match streak {
        7 => Some("Week Warrior"),
        14 => Some("Two Week Champion"),
        30 => Some("Month Master"),
        50 => Some("Fifty Day Legend"),
        100 => Some("Century Unstoppable"),
        365 => Some("Year of Dedication"),
        _ => None,
    }
}
