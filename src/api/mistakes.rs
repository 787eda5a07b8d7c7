use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::db::{MistakeRow, Phrase};
use crate::{AppState, Result};

#[derive(Debug, Serialize)]
pub struct MistakeGroup {
    pub phrase: Phrase,
    pub count: usize,
    pub types: Vec<String>,
    pub last_mistake: DateTime<Utc>,
}

/// Groups mistakes by phrase, most frequent first. Expects `rows` newest
/// first; ties keep the phrase whose latest mistake is most recent on top.
pub fn group_mistakes(rows: Vec<MistakeRow>) -> Vec<MistakeGroup> {
    let mut groups: Vec<MistakeGroup> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.phrase.id) {
            Some(&i) => {
                let group = &mut groups[i];
                group.count += 1;
                if !group.types.contains(&row.mistake_type) {
                    group.types.push(row.mistake_type);
                }
            }
            None => {
                index.insert(row.phrase.id, groups.len());
                groups.push(MistakeGroup {
                    phrase: row.phrase,
                    count: 1,
                    types: vec![row.mistake_type],
                    last_mistake: row.created_at,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

pub async fn list_mistakes(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let rows = state.db.list_mistakes(user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "mistakes": group_mistakes(rows) })))
}
