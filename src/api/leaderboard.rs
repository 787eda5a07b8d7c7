use actix_web::{web, HttpResponse};

use crate::auth::AuthenticatedUser;
use crate::{AppState, Result};

pub const LEADERBOARD_SIZE: i64 = 50;

pub async fn leaderboard(
    AuthenticatedUser(user): AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let top_users = state.db.top_users(LEADERBOARD_SIZE).await?;
    let rank = state.db.user_rank(user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "top_users": top_users,
        "current_user_id": user.id,
        "current_user_rank": rank,
    })))
}
