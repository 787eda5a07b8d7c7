mod common;

use actix_web::{test, App};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;
use wordflow_server::api;
use wordflow_server::auth::Claims;

const PROTECTED_GETS: [&str; 10] = [
    "/api/phrases",
    "/api/courses",
    "/api/progress",
    "/api/mistakes",
    "/api/leaderboard",
    "/api/settings",
    "/api/dashboard",
    "/api/achievements",
    "/api/files",
    "/api/admin/stats",
];

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    for uri in PROTECTED_GETS {
        let resp = test::TestRequest::get().uri(uri).send_request(&app).await;
        assert_eq!(resp.status(), 401, "uri: {}", uri);
    }
}

#[actix_web::test]
async fn test_garbage_token_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    for uri in PROTECTED_GETS {
        let resp = test::TestRequest::get()
            .uri(uri)
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 401, "uri: {}", uri);
    }
}

#[actix_web::test]
async fn test_expired_token_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now - 3600,
        iat: now - 7200,
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test_secret"),
    )
    .unwrap();

    let resp = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_token_from_other_secret_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"someone_else"),
    )
    .unwrap();

    let resp = test::TestRequest::delete()
        .uri(&format!("/api/files/{}", Uuid::new_v4()))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}
