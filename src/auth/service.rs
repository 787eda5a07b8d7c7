use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::db::models::{PasswordResetToken, User, UserSession};
use crate::db::operations::DbOperations;
use crate::email::Mailer;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::Result;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 1024;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
    pub jti: String,  // Token ID
}

/// A freshly issued bearer token and the user it belongs to.
#[derive(Debug, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    db: DbOperations,
    settings: Arc<Settings>,
    mailer: Arc<Mailer>,
}

impl AuthService {
    pub fn new(db: DbOperations, settings: Arc<Settings>, mailer: Arc<Mailer>) -> Self {
        Self { db, settings, mailer }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let email = normalize_email(email);
        let name = name.trim();
        validate_name(name)?;
        validate_email(&email)?;
        validate_password(password)?;

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(DatabaseError::Duplicate.into());
        }

        let password_hash = hash_password(password.to_string()).await?;
        let is_admin = self.settings.is_admin_email(&email);
        let user = self
            .db
            .create_user(&User::new(email, name.to_string(), password_hash, is_admin))
            .await?;

        info!("Registered user {} (admin: {})", user.id, user.is_admin);
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginSession> {
        let Some(user) = self.db.get_user_by_email(&normalize_email(email)).await? else {
            // Unknown addresses still pay for one verification
            verify_password(password.to_string(), dummy_hash().await?.to_string()).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.generate_token(&user.id.to_string())?;
        let session = UserSession::new(user.id, token.clone(), self.settings.auth.token_expiry_hours);
        self.db.create_session(&session).await?;

        Ok(LoginSession { token, user })
    }

    /// Resolves a bearer token to its user. The signature and expiry are
    /// checked before the database is consulted.
    pub async fn validate_token(&self, token: &str) -> Result<User> {
        let claims = self.decode_token(token)?;

        let session = self
            .db
            .get_session_by_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired() {
            return Err(AuthError::TokenExpired.into());
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let user = self
            .db
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.db.update_session_activity(token).await?;

        Ok(user)
    }

    pub async fn invalidate_token(&self, token: &str) -> Result<()> {
        self.db.delete_session(token).await
    }

    /// Issues a reset token and emails it. Unknown addresses are silently
    /// ignored so the response does not reveal which accounts exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let Some(user) = self.db.get_user_by_email(&email).await? else {
            info!("Password reset requested for unknown address");
            return Ok(());
        };

        let token = generate_reset_token();
        let now = Utc::now();
        let record = PasswordResetToken {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            token_hash: hash_reset_token(&token),
            expires_at: now + Duration::minutes(self.settings.auth.reset_token_expiry_minutes),
            created_at: now,
        };
        self.db.replace_reset_token(&record).await?;

        self.mailer.send_password_reset(&user.email, &token).await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;

        let record = self
            .db
            .get_reset_token(&hash_reset_token(token))
            .await?
            .ok_or_else(|| AppError::ValidationError("Invalid or expired reset link".into()))?;

        if record.is_expired() {
            self.db.delete_reset_token(record.id).await?;
            return Err(AppError::ValidationError(
                "Reset link has expired. Request a new one.".into(),
            ));
        }

        let user = self
            .db
            .get_user_by_email(&record.email)
            .await?
            .ok_or_else(|| AppError::ValidationError("User not found".into()))?;

        let password_hash = hash_password(new_password.to_string()).await?;
        self.db.update_user_password(user.id, &password_hash).await?;
        self.db.delete_reset_token(record.id).await?;

        let revoked = self.db.delete_user_sessions(user.id).await?;
        info!("Password reset for user {}, revoked {} sessions", user.id, revoked);
        Ok(())
    }

    fn generate_token(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.settings.auth.token_expiry_hours)).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.auth.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn decode_token(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.auth.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(claims.claims)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<()> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .unwrap_or(false);

    if !valid {
        return Err(AppError::ValidationError("Invalid email address".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters".into(),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::ValidationError("Password is too long".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::ValidationError("Name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::ValidationError("Name is too long".into()));
    }
    Ok(())
}

/// 32 random bytes, base64url without padding. Only its hash is stored.
fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_reset_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
            .map_err(|e| AppError::InternalError(format!("Failed to encode salt: {}", e)))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    })
    .await?
}

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// A real argon2 hash with the default parameters, used for logins that
/// match no account.
async fn dummy_hash() -> Result<&'static str> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password(generate_reset_token()))
        .await
        .map(String::as_str)
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(AppError::from)
}
