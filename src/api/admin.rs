use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::{parse_level, required_text};
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::{AppState, Result};

pub const PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 100_000;
const MAX_CATEGORY_CHARS: usize = 100;
const MAX_PHRASE_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhraseListQuery {
    pub page: Option<i64>,
    pub level: Option<String>,
    pub search: Option<String>,
}

fn page_number(page: Option<i64>) -> Result<i64> {
    let page = page.unwrap_or(1).max(1);
    if page > MAX_PAGE {
        return Err(AppError::ValidationError(format!(
            "Page must be at most {}",
            MAX_PAGE
        )));
    }
    Ok(page)
}

pub async fn stats(_admin: AdminUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.db.admin_stats().await?))
}

pub async fn list_users(
    _admin: AdminUser,
    query: web::Query<UserListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let page = state
        .db
        .list_users_page(page_number(query.page)?, PAGE_SIZE, query.search.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub is_admin: bool,
}

pub async fn update_user(
    AdminUser(admin): AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user = state
        .db
        .set_user_admin(path.into_inner(), req.is_admin)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!("Admin {} set is_admin={} for user {}", admin.id, user.is_admin, user.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

pub async fn list_phrases(
    _admin: AdminUser,
    query: web::Query<PhraseListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Some(level) = query.level.as_deref() {
        parse_level(level)?;
    }

    let page = state
        .db
        .list_phrases_page(
            page_number(query.page)?,
            PAGE_SIZE,
            query.level.as_deref(),
            query.search.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[derive(Debug, Default, Deserialize)]
pub struct PhraseRequest {
    pub english: Option<String>,
    pub georgian: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

/// Validated phrase fields; `None` means the field was not supplied.
#[derive(Debug, PartialEq)]
pub struct PhraseFields {
    pub english: Option<String>,
    pub georgian: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

impl PhraseRequest {
    pub fn validate(&self) -> Result<PhraseFields> {
        let english = self
            .english
            .as_deref()
            .map(|v| required_text("English", v, MAX_PHRASE_CHARS))
            .transpose()?;
        let georgian = self
            .georgian
            .as_deref()
            .map(|v| required_text("Georgian", v, MAX_PHRASE_CHARS))
            .transpose()?;
        let level = self
            .level
            .as_deref()
            .map(|v| parse_level(v.trim()).map(|l| l.as_str().to_string()))
            .transpose()?;
        let category = self
            .category
            .as_deref()
            .map(|v| required_text("Category", v, MAX_CATEGORY_CHARS))
            .transpose()?;

        Ok(PhraseFields {
            english,
            georgian,
            level,
            category,
        })
    }
}

pub async fn create_phrase(
    AdminUser(admin): AdminUser,
    req: web::Json<PhraseRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let fields = req.validate()?;
    let (Some(english), Some(georgian), Some(level), Some(category)) =
        (fields.english, fields.georgian, fields.level, fields.category)
    else {
        return Err(AppError::ValidationError("Missing required fields".into()));
    };

    let phrase = state
        .db
        .create_phrase(&english, &georgian, &level, &category)
        .await?;

    info!("Admin {} created phrase {}", admin.id, phrase.id);
    Ok(HttpResponse::Created().json(serde_json::json!({ "phrase": phrase })))
}

pub async fn update_phrase(
    _admin: AdminUser,
    path: web::Path<i32>,
    req: web::Json<PhraseRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let fields = req.validate()?;

    let phrase = state
        .db
        .update_phrase(
            path.into_inner(),
            fields.english.as_deref(),
            fields.georgian.as_deref(),
            fields.level.as_deref(),
            fields.category.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Phrase not found".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "phrase": phrase })))
}

pub async fn delete_phrase(
    AdminUser(admin): AdminUser,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if !state.db.delete_phrase(id).await? {
        return Err(AppError::NotFound("Phrase not found".into()));
    }

    info!("Admin {} deleted phrase {}", admin.id, id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
