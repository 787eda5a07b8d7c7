use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CefrLevel;
use crate::db::{Achievement, LevelSummary};

/// What an achievement's `requirement` is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Phrases,
    Streak,
    Xp,
    Level,
    Perfect,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::Phrases => "phrases",
            AchievementKind::Streak => "streak",
            AchievementKind::Xp => "xp",
            AchievementKind::Level => "level",
            AchievementKind::Perfect => "perfect",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phrases" => Ok(AchievementKind::Phrases),
            "streak" => Ok(AchievementKind::Streak),
            "xp" => Ok(AchievementKind::Xp),
            "level" => Ok(AchievementKind::Level),
            "perfect" => Ok(AchievementKind::Perfect),
            other => Err(format!("Unknown achievement kind: {}", other)),
        }
    }
}

/// Catalogue entry installed by the seed binary.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: i32,
    pub kind: AchievementKind,
}

const fn def(
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    requirement: i32,
    kind: AchievementKind,
) -> AchievementDef {
    AchievementDef {
        name,
        description,
        icon,
        requirement,
        kind,
    }
}

pub const DEFAULT_ACHIEVEMENTS: [AchievementDef; 21] = [
    def("First Step", "პირველი გაკვეთილის დასრულება", "👶", 1, AchievementKind::Phrases),
    def("Getting Started", "10 ფრაზის სწავლა", "📚", 10, AchievementKind::Phrases),
    def("Committed Learner", "50 ფრაზის სწავლა", "🎯", 50, AchievementKind::Phrases),
    def("Century Club", "100 ფრაზის სწავლა", "💯", 100, AchievementKind::Phrases),
    def("Phrase Master", "500 ფრაზის სწავლა", "🏆", 500, AchievementKind::Phrases),
    def("Week Warrior", "7 დღის streak", "🔥", 7, AchievementKind::Streak),
    def("Two Week Champion", "14 დღის streak", "⚡", 14, AchievementKind::Streak),
    def("Month Master", "30 დღის streak", "🌟", 30, AchievementKind::Streak),
    def("Unstoppable", "100 დღის streak", "💎", 100, AchievementKind::Streak),
    def("XP Starter", "100 XP მოგროვება", "⭐", 100, AchievementKind::Xp),
    def("XP Hunter", "500 XP მოგროვება", "🌙", 500, AchievementKind::Xp),
    def("XP Champion", "1000 XP მოგროვება", "☀️", 1000, AchievementKind::Xp),
    def("XP Legend", "5000 XP მოგროვება", "👑", 5000, AchievementKind::Xp),
    def("A1 Complete", "A1 დონის დასრულება", "🥉", 1, AchievementKind::Level),
    def("A2 Complete", "A2 დონის დასრულება", "🥈", 2, AchievementKind::Level),
    def("B1 Complete", "B1 დონის დასრულება", "🥇", 3, AchievementKind::Level),
    def("B2 Complete", "B2 დონის დასრულება", "🏅", 4, AchievementKind::Level),
    def("C1 Complete", "C1 დონის დასრულება", "🎖️", 5, AchievementKind::Level),
    def("C2 Complete", "C2 დონის დასრულება", "🏆", 6, AchievementKind::Level),
    def("Perfect Round", "100% სწორი პასუხები ერთ სესიაში", "✨", 1, AchievementKind::Perfect),
    def("Perfect Streak", "5 სრულყოფილი სესია ზედიზედ", "💫", 5, AchievementKind::Perfect),
];

/// Snapshot of everything achievements are measured against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementProgress {
    pub learned_phrases: i64,
    pub streak: i32,
    pub total_xp: i32,
    pub completed_levels: i32,
    pub perfect_streak: i32,
}

impl AchievementProgress {
    fn value_for(&self, kind: AchievementKind) -> i64 {
        match kind {
            AchievementKind::Phrases => self.learned_phrases,
            AchievementKind::Streak => i64::from(self.streak),
            AchievementKind::Xp => i64::from(self.total_xp),
            AchievementKind::Level => i64::from(self.completed_levels),
            AchievementKind::Perfect => i64::from(self.perfect_streak),
        }
    }

    pub fn meets(&self, achievement: &Achievement) -> bool {
        match achievement.kind.parse::<AchievementKind>() {
            Ok(kind) => self.value_for(kind) >= i64::from(achievement.requirement),
            Err(_) => false,
        }
    }
}

/// Achievements from `catalogue` that `progress` qualifies for and that are
/// not in `already_earned`.
pub fn newly_earned<'a>(
    catalogue: &'a [Achievement],
    already_earned: &HashSet<Uuid>,
    progress: &AchievementProgress,
) -> Vec<&'a Achievement> {
    catalogue
        .iter()
        .filter(|a| !already_earned.contains(&a.id))
        .filter(|a| progress.meets(a))
        .collect()
}

/// Number of fully learned levels, counted from A1 upwards without gaps.
/// A level with no phrases is never complete.
pub fn completed_levels(summaries: &[LevelSummary]) -> i32 {
    let mut completed = 0;
    for level in CefrLevel::ALL {
        let done = summaries
            .iter()
            .find(|s| s.level == level.as_str())
            .map(|s| s.phrase_count > 0 && s.learned_count >= s.phrase_count)
            .unwrap_or(false);
        if !done {
            break;
        }
        completed += 1;
    }
    completed
}
