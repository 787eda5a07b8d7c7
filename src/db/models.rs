use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::gamification::CefrLevel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub current_level: String,
    pub total_xp: i32,
    pub streak: i32,
    pub longest_streak: i32,
    pub daily_goal: i32,
    pub daily_progress: i32,
    pub perfect_sessions: i32,
    pub perfect_streak: i32,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            is_admin,
            current_level: CefrLevel::A1.to_string(),
            total_xp: 0,
            streak: 0,
            longest_streak: 0,
            daily_goal: 10,
            daily_progress: 0,
            perfect_sessions: 0,
            perfect_streak: 0,
            last_active_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored level, falling back to A1 if the column holds something unexpected.
    pub fn level(&self) -> CefrLevel {
        self.current_level.parse().unwrap_or(CefrLevel::A1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: Uuid, token: String, expires_in_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            expires_at: now + chrono::Duration::hours(expires_in_hours),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub email: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Phrase {
    pub id: i32,
    pub english: String,
    pub georgian: String,
    pub level: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phrase_id: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub learned: bool,
    pub last_practiced: DateTime<Utc>,
}

/// Progress row joined with its phrase.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressWithPhrase {
    pub phrase_id: i32,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub learned: bool,
    pub last_practiced: DateTime<Utc>,
    #[sqlx(flatten)]
    pub phrase: Phrase,
}

/// One recorded mistake joined with its phrase.
#[derive(Debug, Clone, FromRow)]
pub struct MistakeRow {
    pub mistake_type: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub phrase: Phrase,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement: i32,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AchievementWithStatus {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub achievement: Achievement,
    pub earned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserFile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub mime_type: String,
    pub size: i64,
    pub text_content: String,
    pub created_at: DateTime<Utc>,
}

impl UserFile {
    pub fn new(
        user_id: Uuid,
        name: String,
        storage_key: String,
        mime_type: String,
        size: i64,
        text_content: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            storage_key,
            mime_type,
            size,
            text_content,
            created_at: Utc::now(),
        }
    }
}

/// File listing row with word counts.
#[derive(Debug, Clone, FromRow)]
pub struct FileSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub total_words: i64,
    pub learned_words: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileWord {
    pub id: Uuid,
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub english: String,
    pub georgian: String,
    pub context: String,
    pub learned: bool,
    pub correct_count: i32,
    pub wrong_count: i32,
    pub last_practiced: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FileWord {
    pub fn new(file_id: Uuid, user_id: Uuid, english: String, georgian: String, context: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_id,
            user_id,
            english,
            georgian,
            context,
            learned: false,
            correct_count: 0,
            wrong_count: 0,
            last_practiced: None,
            created_at: Utc::now(),
        }
    }
}

/// A file word together with the owner of the file it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct FileWordWithOwner {
    #[sqlx(flatten)]
    pub word: FileWord,
    pub file_owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub name: String,
    pub total_xp: i32,
    pub streak: i32,
    pub current_level: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategorySummary {
    pub category: String,
    pub phrase_count: i64,
    pub learned_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LevelSummary {
    pub level: String,
    pub phrase_count: i64,
    pub learned_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub total_xp: i32,
    pub streak: i32,
    pub current_level: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub learned_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub total_xp: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_phrases: i64,
    pub learned_progress: i64,
    pub total_mistakes: i64,
    pub active_users_7d: i64,
    pub phrases_by_level: Vec<LevelCount>,
    pub recent_users: Vec<RecentUser>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LevelCount {
    pub level: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
