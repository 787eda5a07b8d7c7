//! HTTP routes under `/api`. Everything except `/api/auth/*` requires a
//! bearer token; `/api/admin/*` additionally requires the admin flag.

pub mod achievements;
pub mod admin;
pub mod courses;
pub mod dashboard;
pub mod files;
pub mod leaderboard;
pub mod learn;
pub mod mistakes;
pub mod phrases;
pub mod progress;
pub mod settings;
pub mod words;

use actix_web::web;

use crate::auth;
use crate::error::AppError;
use crate::gamification::CefrLevel;
use crate::Result;

const JSON_LIMIT: usize = 64 * 1024;

/// Mistake categories a client may report, one per exercise type.
pub const MISTAKE_TYPES: [&str; 6] = ["flashcard", "quiz", "fill_blank", "ordering", "matching", "typing"];

pub const MAX_USER_ANSWER_LEN: usize = 2000;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::ValidationError(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .configure(auth::handlers::configure)
            .route("/phrases", web::get().to(phrases::list_phrases))
            .route("/courses", web::get().to(courses::list_courses))
            .route("/courses/{level}", web::get().to(courses::course_detail))
            .route("/learn/typing/check", web::post().to(learn::check_typing))
            .route("/learn/ordering/check", web::post().to(learn::check_ordering))
            .route("/learn/matching/check", web::post().to(learn::check_matching))
            .route("/learn/flashcards/review", web::post().to(learn::review_flashcard_session))
            .route("/learn/{mode}/{level}", web::get().to(learn::exercise))
            .route("/progress", web::get().to(progress::list_progress))
            .route("/progress/update", web::post().to(progress::update_progress))
            .route("/progress/session", web::post().to(progress::complete_session))
            .route("/mistakes", web::get().to(mistakes::list_mistakes))
            .route("/leaderboard", web::get().to(leaderboard::leaderboard))
            .route("/settings", web::get().to(settings::get_settings))
            .route("/settings", web::put().to(settings::update_settings))
            .route("/dashboard", web::get().to(dashboard::dashboard))
            .route("/achievements", web::get().to(achievements::list_achievements))
            .route("/files", web::get().to(files::list_files))
            .route("/files/upload", web::post().to(files::upload_file))
            .route("/files/words/progress", web::post().to(words::update_word_progress))
            .route("/files/{id}", web::get().to(files::get_file))
            .route("/files/{id}", web::delete().to(files::delete_file))
            .route("/files/{id}/learn/{mode}", web::get().to(files::learn_file))
            .route("/files/{id}/words", web::post().to(words::add_word))
            .route("/files/{id}/words/{word_id}", web::delete().to(words::delete_word))
            .service(
                web::scope("/admin")
                    .route("/stats", web::get().to(admin::stats))
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}", web::put().to(admin::update_user))
                    .route("/phrases", web::get().to(admin::list_phrases))
                    .route("/phrases", web::post().to(admin::create_phrase))
                    .route("/phrases/{id}", web::put().to(admin::update_phrase))
                    .route("/phrases/{id}", web::delete().to(admin::delete_phrase)),
            ),
    );
}

pub(crate) fn parse_level(value: &str) -> Result<CefrLevel> {
    value
        .parse()
        .map_err(|e: crate::gamification::ParseLevelError| AppError::ValidationError(e.to_string()))
}

pub(crate) fn validate_mistake(mistake_type: Option<&str>, user_answer: Option<&str>) -> Result<()> {
    if let Some(kind) = mistake_type {
        if !MISTAKE_TYPES.contains(&kind) {
            return Err(AppError::ValidationError(format!("Unknown mistake type: {}", kind)));
        }
    }
    if user_answer.map(|a| a.chars().count() > MAX_USER_ANSWER_LEN).unwrap_or(false) {
        return Err(AppError::ValidationError("Answer is too long".into()));
    }
    Ok(())
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("B1").unwrap(), CefrLevel::B1);
        assert!(matches!(parse_level("Z9"), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_validate_mistake() {
        assert!(validate_mistake(None, None).is_ok());
        assert!(validate_mistake(Some("fill_blank"), Some("gamarjoba")).is_ok());
        assert!(validate_mistake(Some("guess"), None).is_err());
        let long = "a".repeat(MAX_USER_ANSWER_LEN + 1);
        assert!(validate_mistake(Some("typing"), Some(&long)).is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Word", "  hello ", 10).unwrap(), "hello");
        assert!(required_text("Word", "   ", 10).is_err());
        assert!(required_text("Word", "ქართული ენა", 5).is_err());
        assert!(required_text("Word", "ქართული", 7).is_ok());
    }
}
