use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::files::owned_file;
use crate::api::progress::record_practice;
use crate::api::{required_text, validate_mistake};
use crate::auth::AuthenticatedUser;
use crate::db::{FileWord, FileWordWithOwner, User};
use crate::error::{AppError, AuthError};
use crate::files::extract_sentence;
use crate::{AppState, Result};

pub const MAX_WORD_CHARS: usize = 500;
pub const MAX_CONTEXT_CHARS: usize = 2000;

#[derive(Debug, Default, Deserialize)]
pub struct AddWordRequest {
    pub english: String,
    pub georgian: String,
    pub context: Option<String>,
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
}

#[derive(Debug, PartialEq)]
pub struct NewWord {
    pub english: String,
    pub georgian: String,
    pub context: String,
}

impl AddWordRequest {
    /// Validates the request against the file's text. English is stored
    /// lowercased so the same word cannot be added twice in different case.
    pub fn validate(&self, file_text: &str) -> Result<NewWord> {
        let english = required_text("Word", &self.english, MAX_WORD_CHARS)?.to_lowercase();
        let georgian = required_text("Translation", &self.georgian, MAX_WORD_CHARS)?;

        let context = match (self.context.as_deref(), self.selection_start, self.selection_end) {
            (Some(context), _, _) if !context.trim().is_empty() => {
                required_text("Context", context, MAX_CONTEXT_CHARS)?
            }
            (_, Some(start), Some(end)) => {
                let sentence: String = extract_sentence(file_text, start, end)
                    .chars()
                    .take(MAX_CONTEXT_CHARS)
                    .collect();
                if sentence.is_empty() {
                    return Err(AppError::ValidationError("Context is required".into()));
                }
                sentence
            }
            _ => return Err(AppError::ValidationError("Context is required".into())),
        };

        Ok(NewWord {
            english,
            georgian,
            context,
        })
    }
}

pub async fn add_word(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<AddWordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let file = owned_file(&state, &user, path.into_inner()).await?;
    let new_word = req.validate(&file.text_content)?;

    let word = state
        .db
        .create_file_word(&FileWord::new(
            file.id,
            user.id,
            new_word.english,
            new_word.georgian,
            new_word.context,
        ))
        .await?;

    info!("User {} added word {} to file {}", user.id, word.id, file.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "word": word })))
}

/// Loads a word and checks it belongs to `user`.
async fn owned_word(state: &AppState, user: &User, word_id: Uuid) -> Result<FileWordWithOwner> {
    let word = state
        .db
        .get_file_word(word_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Word not found".into()))?;

    if word.file_owner_id != user.id {
        return Err(AuthError::Forbidden.into());
    }
    Ok(word)
}

pub async fn delete_word(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (file_id, word_id) = path.into_inner();
    let word = owned_word(&state, &user, word_id).await?;

    if word.word.file_id != file_id {
        return Err(AuthError::Forbidden.into());
    }

    state.db.delete_file_word(word_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct WordProgressRequest {
    pub file_word_id: Uuid,
    pub correct: bool,
    pub mistake_type: Option<String>,
    pub user_answer: Option<String>,
}

pub async fn update_word_progress(
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<WordProgressRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    validate_mistake(req.mistake_type.as_deref(), req.user_answer.as_deref())?;
    let word = owned_word(&state, &user, req.file_word_id).await?;

    let now = Utc::now();
    let mut tx = state.db.begin_transaction().await?;

    state
        .db
        .record_word_answer_with_transaction(&mut tx, word.word.id, req.correct, now)
        .await?;

    if !req.correct {
        if let Some(mistake_type) = req.mistake_type.as_deref() {
            state
                .db
                .record_word_mistake_with_transaction(
                    &mut tx,
                    user.id,
                    word.word.id,
                    mistake_type,
                    req.user_answer.as_deref(),
                )
                .await?;
        }
    }

    let response = record_practice(&state.db, &mut tx, user.id, req.correct, now).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(response))
}
