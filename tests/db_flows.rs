//! End-to-end flows against a real Postgres database. Set `DATABASE_URL` to
//! run them; without it each test returns early.

use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;
use wordflow_server::db::User;
use wordflow_server::gamification::DEFAULT_ACHIEVEMENTS;
use wordflow_server::{api, AppState, Settings};

const PASSWORD: &str = "password123";

async fn test_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPool::connect(&url).await.expect("Failed to connect to test database");
    sqlx::migrate!().run(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

fn test_state(pool: PgPool, configure: impl FnOnce(&mut Settings)) -> web::Data<AppState> {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    configure(&mut config);
    web::Data::new(AppState::with_pool(config, pool).expect("Failed to build app state"))
}

fn unique_email(name: &str) -> String {
    format!("{}-{}@example.ge", name, Uuid::new_v4().simple())
}

/// Registers a fresh account and returns its bearer header and user row.
async fn sign_up(state: &AppState, email: &str) -> ((&'static str, String), User) {
    state
        .auth_service
        .register(email, PASSWORD, "Tester")
        .await
        .expect("Failed to register");
    let session = state
        .auth_service
        .authenticate(email, PASSWORD)
        .await
        .expect("Failed to log in");
    (("Authorization", format!("Bearer {}", session.token)), session.user)
}

fn multipart_txt(filename: &str, content: &str) -> (String, String) {
    let boundary = "wordflow-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/plain\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        c = content
    );
    (format!("multipart/form-data; boundary={}", boundary), body)
}

#[actix_web::test]
async fn test_phrase_learned_after_three_correct_answers() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    for def in DEFAULT_ACHIEVEMENTS.iter() {
        state.db.upsert_achievement(def).await.unwrap();
    }
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (auth, user) = sign_up(&state, &unique_email("learner")).await;
    let phrase = state
        .db
        .create_phrase("Good luck to you", "წარმატებები", "C2", &format!("test-{}", Uuid::new_v4().simple()))
        .await
        .unwrap();

    let mut last = Value::Null;
    for attempt in 1..=3 {
        let resp = test::TestRequest::post()
            .uri("/api/progress/update")
            .insert_header(auth.clone())
            .set_json(json!({ "phrase_id": phrase.id, "correct": true }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);
        last = test::read_body_json(resp).await;
        assert_eq!(last["xp_gained"], 10);

        let learned = state.db.count_learned_phrases(user.id).await.unwrap();
        assert_eq!(learned, if attempt < 3 { 0 } else { 1 });
    }

    assert_eq!(last["new_total_xp"], 30);
    assert_eq!(last["new_streak"], 1);
    let names: Vec<&str> = last["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["name"].as_str())
        .collect();
    assert!(names.contains(&"First Step"), "achievements: {:?}", names);

    let stored = state.db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.total_xp, 30);
    assert_eq!(stored.daily_progress, 3);
}

#[actix_web::test]
async fn test_wrong_answer_records_mistake() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (auth, _) = sign_up(&state, &unique_email("mistaken")).await;
    let phrase = state
        .db
        .create_phrase("See you later", "მოგვიანებით გნახავ", "A1", "test")
        .await
        .unwrap();

    let resp = test::TestRequest::post()
        .uri("/api/progress/update")
        .insert_header(auth.clone())
        .set_json(json!({
            "phrase_id": phrase.id,
            "correct": false,
            "mistake_type": "typing",
            "user_answer": "see you leter",
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["xp_gained"], 0);

    let resp = test::TestRequest::get()
        .uri("/api/mistakes")
        .insert_header(auth)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let groups = body["mistakes"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["count"], 1);
    assert_eq!(groups[0]["types"], json!(["typing"]));
}

#[actix_web::test]
async fn test_concurrent_answers_keep_every_xp_increment() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (auth, user) = sign_up(&state, &unique_email("racer")).await;
    let mut phrase_ids = Vec::new();
    for i in 0..5 {
        let phrase = state
            .db
            .create_phrase(&format!("Phrase number {}", i), "ფრაზა", "B1", "test")
            .await
            .unwrap();
        phrase_ids.push(phrase.id);
    }

    let requests = phrase_ids.iter().map(|id| {
        test::TestRequest::post()
            .uri("/api/progress/update")
            .insert_header(auth.clone())
            .set_json(json!({ "phrase_id": id, "correct": true }))
            .send_request(&app)
    });
    for resp in futures::future::join_all(requests).await {
        assert_eq!(resp.status(), 200);
    }

    let stored = state.db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.total_xp, 50);
    assert_eq!(stored.daily_progress, 5);
}

#[actix_web::test]
async fn test_file_words_ownership_and_lifecycle() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (owner, _) = sign_up(&state, &unique_email("owner")).await;
    let (stranger, _) = sign_up(&state, &unique_email("stranger")).await;

    let text = "I went to the market. The apples were fresh!";
    let (content_type, body) = multipart_txt("notes.txt", text);
    let resp = test::TestRequest::post()
        .uri("/api/files/upload")
        .insert_header(owner.clone())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let file_id = body["file"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["file"]["mime_type"], "text/plain");

    let resp = test::TestRequest::get()
        .uri(&format!("/api/files/{}", file_id))
        .insert_header(stranger.clone())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 403);

    let start = text.find("market").unwrap();
    let resp = test::TestRequest::post()
        .uri(&format!("/api/files/{}/words", file_id))
        .insert_header(owner.clone())
        .set_json(json!({
            "english": " Market ",
            "georgian": "ბაზარი",
            "selection_start": start,
            "selection_end": start + 6,
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["word"]["english"], "market");
    assert_eq!(body["word"]["context"], "I went to the market.");
    let word_id: Uuid = body["word"]["id"].as_str().unwrap().parse().unwrap();

    let resp = test::TestRequest::post()
        .uri(&format!("/api/files/{}/words", file_id))
        .insert_header(owner.clone())
        .set_json(json!({ "english": "market", "georgian": "ბაზარი", "context": "again" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 409);

    let resp = test::TestRequest::delete()
        .uri(&format!("/api/files/{}/words/{}", file_id, word_id))
        .insert_header(stranger.clone())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 403);

    let resp = test::TestRequest::post()
        .uri("/api/files/words/progress")
        .insert_header(stranger.clone())
        .set_json(json!({ "file_word_id": word_id, "correct": true }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 403);

    for attempt in 1..=3 {
        let resp = test::TestRequest::post()
            .uri("/api/files/words/progress")
            .insert_header(owner.clone())
            .set_json(json!({ "file_word_id": word_id, "correct": true }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200);

        let word = state.db.get_file_word(word_id).await.unwrap().unwrap();
        assert_eq!(word.word.correct_count, attempt);
        assert_eq!(word.word.learned, attempt >= 3);
    }

    let resp = test::TestRequest::delete()
        .uri(&format!("/api/files/{}", file_id))
        .insert_header(stranger)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 403);

    let resp = test::TestRequest::delete()
        .uri(&format!("/api/files/{}", file_id))
        .insert_header(owner)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let file_uuid: Uuid = file_id.parse().unwrap();
    assert!(state.db.get_file(file_uuid).await.unwrap().is_none());
    assert!(state.db.get_file_word(word_id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_admin_routes_require_admin_flag() {
    let Some(pool) = test_pool().await else { return };
    let admin_email = unique_email("admin");
    let admin_list = vec![admin_email.clone()];
    let state = test_state(pool, move |config| config.auth.admin_emails = admin_list);
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (learner, _) = sign_up(&state, &unique_email("learner")).await;
    let (admin, admin_user) = sign_up(&state, &admin_email).await;
    assert!(admin_user.is_admin);

    for uri in ["/api/admin/stats", "/api/admin/users", "/api/admin/phrases"] {
        let resp = test::TestRequest::get()
            .uri(uri)
            .insert_header(learner.clone())
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 403, "uri: {}", uri);

        let resp = test::TestRequest::get()
            .uri(uri)
            .insert_header(admin.clone())
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 200, "uri: {}", uri);
    }

    let resp = test::TestRequest::get()
        .uri("/api/admin/users?page=9223372036854775807")
        .insert_header(admin)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_login_is_case_insensitive() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let email = unique_email("casing");
    sign_up(&state, &email).await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": format!("  {}  ", email.to_uppercase()), "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": unique_email("nobody"), "password": PASSWORD }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_exercise_checks() {
    let Some(pool) = test_pool().await else { return };
    let state = test_state(pool, |_| {});
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let (auth, _) = sign_up(&state, &unique_email("checker")).await;
    let phrase = state
        .db
        .create_phrase("Where is the station", "სად არის სადგური", "A2", "test")
        .await
        .unwrap();

    let resp = test::TestRequest::post()
        .uri("/api/learn/ordering/check")
        .insert_header(auth.clone())
        .set_json(json!({ "card_id": phrase.id, "words": ["Where", "is", "the", "station"] }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["correct"], true);

    let resp = test::TestRequest::post()
        .uri("/api/learn/ordering/check")
        .insert_header(auth.clone())
        .set_json(json!({ "card_id": phrase.id, "words": ["is", "Where", "the", "station"] }))
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["correct"], false);
    assert_eq!(body["expected"], json!(["Where", "is", "the", "station"]));

    let resp = test::TestRequest::post()
        .uri("/api/learn/matching/check")
        .insert_header(auth.clone())
        .set_json(json!({ "english_id": phrase.id, "georgian_id": phrase.id + 1 }))
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["correct"], false);

    let resp = test::TestRequest::post()
        .uri("/api/learn/flashcards/review")
        .insert_header(auth)
        .set_json(json!({ "card_ids": [1, 2], "answers": [false, true, true] }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["complete"], true);
    assert_eq!(body["mistakes"], json!([1]));
}
