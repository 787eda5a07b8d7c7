use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::parse_level;
use crate::auth::{validate_name, AuthenticatedUser};
use crate::db::User;
use crate::error::AppError;
use crate::gamification::CefrLevel;
use crate::{AppState, Result};

pub const MIN_DAILY_GOAL: i32 = 1;
pub const MAX_DAILY_GOAL: i32 = 100;

#[derive(Debug, Serialize)]
pub struct UserSettings {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub daily_goal: i32,
    pub current_level: String,
}

impl From<User> for UserSettings {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            daily_goal: user.daily_goal,
            current_level: user.current_level,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub name: Option<String>,
    pub daily_goal: Option<i32>,
    pub current_level: Option<String>,
}

/// Validated changes; `None` leaves a field unchanged.
#[derive(Debug, PartialEq)]
pub struct SettingsChange {
    pub name: Option<String>,
    pub daily_goal: Option<i32>,
    pub current_level: Option<CefrLevel>,
}

impl UpdateSettingsRequest {
    pub fn validate(&self) -> Result<SettingsChange> {
        let name = match self.name.as_deref() {
            Some(name) => {
                let name = name.trim();
                validate_name(name)?;
                Some(name.to_string())
            }
            None => None,
        };

        if let Some(goal) = self.daily_goal {
            if !(MIN_DAILY_GOAL..=MAX_DAILY_GOAL).contains(&goal) {
                return Err(AppError::ValidationError("Invalid daily goal".into()));
            }
        }

        let current_level = self.current_level.as_deref().map(parse_level).transpose()?;

        Ok(SettingsChange {
            name,
            daily_goal: self.daily_goal,
            current_level,
        })
    }
}

pub async fn get_settings(AuthenticatedUser(user): AuthenticatedUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": UserSettings::from(user) })))
}

pub async fn update_settings(
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<UpdateSettingsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let change = req.validate()?;

    let updated = state
        .db
        .update_user_settings(
            user.id,
            change.name.as_deref(),
            change.daily_goal,
            change.current_level.map(|level| level.as_str()),
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": UserSettings::from(updated) })))
}
