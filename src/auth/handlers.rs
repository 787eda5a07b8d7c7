use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::extractor::bearer_token;
use crate::error::AuthError;
use crate::{AppState, Result};

const RESET_REQUESTED_MESSAGE: &str = "If that email is registered, a reset link has been sent";
const RESET_DONE_MESSAGE: &str = "Password has been reset";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.login_limiter.check_rate_limit(req.email.trim()).await {
        warn!("Login rate limit hit for {}", req.email);
        return Err(AuthError::RateLimited.into());
    }

    let session = state.auth_service.authenticate(&req.email, &req.password).await?;
    info!("Login successful for user {}", session.user.id);
    Ok(HttpResponse::Ok().json(session))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user = state
        .auth_service
        .register(&req.email, &req.password, &req.name)
        .await?;

    // Registering signs the new user in straight away
    let session = state.auth_service.authenticate(&user.email, &req.password).await?;
    Ok(HttpResponse::Created().json(session))
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = bearer_token(&req).ok_or(AuthError::MissingToken)?;

    state.auth_service.invalidate_token(token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully logged out"
    })))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    req: web::Json<ForgotPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.auth_service.request_password_reset(&req.email).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": RESET_REQUESTED_MESSAGE
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

pub async fn reset_password(
    req: web::Json<ResetPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.auth_service.reset_password(&req.token, &req.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": RESET_DONE_MESSAGE
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password)),
    );
}
