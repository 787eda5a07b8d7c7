use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::db::User;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The user behind a valid bearer token.
pub struct AuthenticatedUser(pub User);

/// A signed-in user with the admin flag.
pub struct AdminUser(pub User);

fn resolve_user(req: &HttpRequest) -> LocalBoxFuture<'static, Result<User, AppError>> {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req).map(str::to_string);

    Box::pin(async move {
        let state = state
            .ok_or_else(|| AppError::InternalError("Application state is not configured".into()))?;
        let token = token.ok_or(AuthError::MissingToken)?;
        state.auth_service.validate_token(&token).await
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = resolve_user(req);
        Box::pin(async move { Ok(AuthenticatedUser(user.await?)) })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = resolve_user(req);
        Box::pin(async move {
            let user = user.await?;
            if !user.is_admin {
                return Err(AuthError::Forbidden.into());
            }
            Ok(AdminUser(user))
        })
    }
}
