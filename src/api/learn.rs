use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::MAX_USER_ANSWER_LEN;
use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AuthError};
use crate::games::{
    build_exercise, check_typed_answer, is_correct_order, is_match, review_flashcards, Card,
    CardId, Mode, Source, SESSION_SIZE,
};
use crate::gamification::CefrLevel;
use crate::{AppState, Result};

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
    pub category: Option<String>,
}

pub(crate) fn parse_mode(value: &str) -> Result<Mode> {
    value.parse().map_err(AppError::NotFound)
}

pub async fn exercise(
    _user: AuthenticatedUser,
    path: web::Path<(String, String)>,
    query: web::Query<ExerciseQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (mode, level) = path.into_inner();
    let mode = parse_mode(&mode)?;
    let level: CefrLevel = level
        .parse()
        .map_err(|_| AppError::NotFound("Level not found".into()))?;

    let phrases = state
        .db
        .phrases_for_level(level.as_str(), query.category.as_deref())
        .await?;
    let cards: Vec<Card> = phrases.iter().map(Card::from).collect();

    let exercise = build_exercise(mode, Source::Phrases, &cards, &mut rand::thread_rng())
        .ok_or_else(|| AppError::NotFound("Not enough phrases for this exercise".into()))?;

    debug!("Built {} exercise for {} from {} phrases", mode, level, cards.len());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "level": level,
        "category": query.category,
        "exercise": exercise,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TypingCheckRequest {
    pub phrase_id: i32,
    pub answer: String,
}

pub async fn check_typing(
    _user: AuthenticatedUser,
    req: web::Json<TypingCheckRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.answer.chars().count() > MAX_USER_ANSWER_LEN {
        return Err(AppError::ValidationError("Answer is too long".into()));
    }

    let phrase = state
        .db
        .get_phrase(req.phrase_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Phrase not found".into()))?;

    Ok(HttpResponse::Ok().json(check_typed_answer(&req.answer, &phrase.english)))
}

/// Most words an ordering answer may contain.
const MAX_ORDERING_WORDS: usize = 50;
/// Most answers a flashcard review may replay.
const MAX_FLASHCARD_ANSWERS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct OrderingCheckRequest {
    pub card_id: CardId,
    pub words: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderingCheck {
    pub correct: bool,
    pub expected: Vec<String>,
}

/// English text of a phrase or of one of the user's file words.
async fn card_english(state: &AppState, user_id: uuid::Uuid, card_id: CardId) -> Result<String> {
    match card_id {
        CardId::Phrase(id) => state
            .db
            .get_phrase(id)
            .await?
            .map(|phrase| phrase.english)
            .ok_or_else(|| AppError::NotFound("Phrase not found".into())),
        CardId::Word(id) => {
            let word = state
                .db
                .get_file_word(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Word not found".into()))?;
            if word.file_owner_id != user_id {
                return Err(AuthError::Forbidden.into());
            }
            Ok(word.word.english)
        }
    }
}

pub async fn check_ordering(
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<OrderingCheckRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.words.len() > MAX_ORDERING_WORDS {
        return Err(AppError::ValidationError("Too many words".into()));
    }

    let english = card_english(&state, user.id, req.card_id).await?;
    let expected: Vec<String> = english.split_whitespace().map(str::to_string).collect();

    Ok(HttpResponse::Ok().json(OrderingCheck {
        correct: is_correct_order(&req.words, &expected),
        expected,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MatchingCheckRequest {
    pub english_id: CardId,
    pub georgian_id: CardId,
}

pub async fn check_matching(
    _user: AuthenticatedUser,
    req: web::Json<MatchingCheckRequest>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "correct": is_match(req.english_id, req.georgian_id),
    })))
}

#[derive(Debug, Deserialize)]
pub struct FlashcardReviewRequest {
    pub card_ids: Vec<CardId>,
    pub answers: Vec<bool>,
}

impl FlashcardReviewRequest {
    pub fn validate(&self) -> Result<()> {
        if self.card_ids.is_empty() || self.card_ids.len() > SESSION_SIZE {
            return Err(AppError::ValidationError(format!(
                "A deck must have between 1 and {} cards",
                SESSION_SIZE
            )));
        }
        if self.answers.len() > MAX_FLASHCARD_ANSWERS {
            return Err(AppError::ValidationError("Too many answers".into()));
        }
        Ok(())
    }
}

/// Replays a flashcard session and reports which cards count as mistakes.
pub async fn review_flashcard_session(
    _user: AuthenticatedUser,
    req: web::Json<FlashcardReviewRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let req = req.into_inner();
    Ok(HttpResponse::Ok().json(review_flashcards(req.card_ids, &req.answers)))
}
