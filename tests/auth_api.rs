mod common;

use actix_web::{test, App};
use serde_json::json;
use wordflow_server::api;

#[actix_web::test]
async fn test_invalid_registration() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let bad_inputs = [
        json!({ "name": "Nino", "email": "not-an-email", "password": "password123" }),
        json!({ "name": "Nino", "email": "nino@example.ge", "password": "short" }),
        json!({ "name": "   ", "email": "nino@example.ge", "password": "password123" }),
        json!({ "email": "nino@example.ge", "password": "password123" }),
    ];

    for body in bad_inputs {
        let resp = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&body)
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400, "body: {}", body);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"]["status"], 400);
        assert!(json["error"]["message"].is_string());
    }
}

#[actix_web::test]
async fn test_forgot_password_rejects_invalid_email() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "nobody" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_reset_password_rejects_short_password() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/reset-password")
        .set_json(json!({ "token": "abc", "password": "123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["error"]["message"], "Password must be at least 8 characters");
}

#[actix_web::test]
async fn test_logout_requires_token() {
    let app = test::init_service(
        App::new()
            .app_data(common::test_state())
            .configure(api::configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/logout")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_login_rate_limited() {
    let state = common::test_state_with(|config| config.auth.login_attempts_per_minute = 0);
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "nino@example.ge", "password": "password123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 429);
}
