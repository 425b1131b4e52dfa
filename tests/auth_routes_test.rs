mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};

use common::{sign_up, TestApp, GOOGLE_EMAIL, GOOGLE_PICTURE, GOOGLE_TOKEN};

#[actix_rt::test]
async fn test_signup_rejects_short_passwords() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "a@b.com", "password": "short", "name": "A" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Password must be at least 6 characters");
}

#[actix_rt::test]
async fn test_signup_issues_token_for_normalized_email() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": " A@B.com ", "password": "sixsix" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["name"], "a");
    assert_eq!(body["user"]["role"], "traveler");
    assert!(body["user"].get("password").is_none());

    let claims = test_app
        .state
        .tokens
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.user_id, body["user"]["_id"].as_str().unwrap());
}

#[actix_rt::test]
async fn test_signup_rejects_duplicates_and_bad_input() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    sign_up(&app, "twice@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "TWICE@example.com", "password": "another1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    for body in [
        json!({ "email": "not-an-email", "password": "secret1" }),
        json!({ "password": "secret1" }),
        json!({ "email": "x@example.com" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    sign_up(&app, "login@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "login@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");

    for (email, password) in [
        ("login@example.com", "wrong-password"),
        ("nobody@example.com", "secret1"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid email or password");
    }
}

#[actix_rt::test]
async fn test_me_requires_a_valid_token() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let (token, id) = sign_up(&app, "me@example.com").await;

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, "Bearer garbage"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["_id"], id.as_str());
    assert_eq!(body["preferences"]["travel_style"], "leisure");
}

#[actix_rt::test]
async fn test_preferences_are_replaced() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let (token, _) = sign_up(&app, "prefs@example.com").await;

    let req = test::TestRequest::put()
        .uri("/api/auth/preferences")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({
            "travel_style": "adventure",
            "budget_currency": "eur",
            "notifications": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["preferences"]["travel_style"], "adventure");
    assert_eq!(body["user"]["preferences"]["budget_currency"], "EUR");
    assert_eq!(body["user"]["preferences"]["notifications"], false);

    let req = test::TestRequest::put()
        .uri("/api/auth/preferences")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({
            "travel_style": "luxury",
            "budget_currency": "USD",
            "notifications": true
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_google_sign_in_upserts_by_email() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/auth/google")
            .set_json(json!({ "id_token": GOOGLE_TOKEN }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], GOOGLE_EMAIL);
        assert_eq!(body["user"]["picture"], GOOGLE_PICTURE);
        assert_eq!(body["user"]["auth_provider"], "google");
        ids.push(body["user"]["_id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids[0], ids[1]);

    // Federated accounts have no password to log in with
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": GOOGLE_EMAIL, "password": "anything" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_rt::test]
async fn test_google_sign_in_rejects_bad_tokens() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/google")
        .set_json(json!({ "id_token": "forged" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/auth/google")
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}
