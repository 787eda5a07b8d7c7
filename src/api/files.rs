use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::courses::percent;
use crate::api::learn::parse_mode;
use crate::auth::AuthenticatedUser;
use crate::db::{FileSummaryRow, User, UserFile};
use crate::error::{AppError, AuthError};
use crate::files::{generate_file_key, parse_file_content, resolve_mime_type, validate_size};
use crate::games::{build_exercise, Card, Source};
use crate::storage::discard_blob;
use crate::{AppState, Result};

const MAX_FILENAME_CHARS: usize = 255;

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub total_words: i64,
    pub learned_words: i64,
    pub progress: i64,
}

impl From<FileSummaryRow> for FileSummary {
    fn from(row: FileSummaryRow) -> Self {
        Self {
            progress: percent(row.learned_words, row.total_words),
            id: row.id,
            name: row.name,
            mime_type: row.mime_type,
            size: row.size,
            created_at: row.created_at,
            total_words: row.total_words,
            learned_words: row.learned_words,
        }
    }
}

/// Loads a file and checks it belongs to `user`.
pub(crate) async fn owned_file(state: &AppState, user: &User, file_id: Uuid) -> Result<UserFile> {
    let file = state
        .db
        .get_file(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    if file.user_id != user.id {
        return Err(AuthError::Forbidden.into());
    }
    Ok(file)
}

struct Upload {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Reads the `file` field, failing as soon as it grows past the size limit.
async fn read_upload(mut payload: Multipart) -> Result<Upload> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != "file" {
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .map(|name| name.chars().take(MAX_FILENAME_CHARS).collect::<String>())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            validate_size(data.len() + chunk.len())?;
            data.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            filename,
            content_type,
            data: data.freeze(),
        });
    }

    Err(AppError::ValidationError("No file provided".into()))
}

pub async fn upload_file(
    AuthenticatedUser(user): AuthenticatedUser,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let upload = read_upload(payload).await?;
    let mime_type = resolve_mime_type(upload.content_type.as_deref(), &upload.filename)?;

    let parse_data = upload.data.clone();
    let text_content =
        tokio::task::spawn_blocking(move || parse_file_content(&parse_data, mime_type)).await??;

    let key = generate_file_key(&user.id, &upload.filename, Utc::now().timestamp_millis());
    let size = upload.data.len() as i64;
    state.storage.put(&key, upload.data).await?;

    let record = UserFile::new(
        user.id,
        upload.filename,
        key.clone(),
        mime_type.to_string(),
        size,
        text_content,
    );
    let file = match state.db.create_file(&record).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to save file record for {}: {}", key, e);
            discard_blob(state.storage.as_ref(), &key).await;
            return Err(e);
        }
    };

    info!("User {} uploaded {} ({} bytes)", user.id, file.name, file.size);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "file": {
            "id": file.id,
            "name": file.name,
            "mime_type": file.mime_type,
            "size": file.size,
            "created_at": file.created_at,
        }
    })))
}

pub async fn list_files(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let files: Vec<FileSummary> = state
        .db
        .list_files(user.id)
        .await?
        .into_iter()
        .map(FileSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "files": files })))
}

pub async fn get_file(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let file = owned_file(&state, &user, path.into_inner()).await?;
    let words = state.db.list_file_words(file.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "file": {
            "id": file.id,
            "name": file.name,
            "mime_type": file.mime_type,
            "size": file.size,
            "text_content": file.text_content,
            "created_at": file.created_at,
            "words": words,
        }
    })))
}

pub async fn delete_file(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let file = owned_file(&state, &user, path.into_inner()).await?;

    discard_blob(state.storage.as_ref(), &file.storage_key).await;
    state.db.delete_file(file.id).await?;

    info!("User {} deleted file {}", user.id, file.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub async fn learn_file(
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (file_id, mode) = path.into_inner();
    let mode = parse_mode(&mode)?;
    let file = owned_file(&state, &user, file_id).await?;

    let words = state.db.list_file_words(file.id).await?;
    let cards: Vec<Card> = words.iter().map(Card::from).collect();

    let exercise = build_exercise(mode, Source::FileWords, &cards, &mut rand::thread_rng())
        .ok_or_else(|| AppError::NotFound("Not enough words for this exercise".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "file_id": file.id,
        "file_name": file.name,
        "exercise": exercise,
    })))
}
