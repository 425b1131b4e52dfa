mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};

use common::{sign_up, TestApp};
use travel_buddy_api::models::user::UserRole;

#[actix_rt::test]
async fn test_platform_stats_require_an_elevated_role() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let (traveler, _) = sign_up(&app, "curious@example.com").await;
    let (admin, _) = test_app.user_with_role("ops@example.com", UserRole::Admin).await;
    let (editor, _) = test_app
        .user_with_role("editor@example.com", UserRole::ContentManager)
        .await;

    let req = test::TestRequest::get().uri("/api/analytics/stats").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    for token in [traveler, editor] {
        let req = test::TestRequest::get()
            .uri("/api/analytics/stats")
            .insert_header((header::AUTHORIZATION, token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unauthorized");
    }

    let req = test::TestRequest::get()
        .uri("/api/analytics/stats")
        .insert_header((header::AUTHORIZATION, admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_users"], 3);
    assert_eq!(body["total_itineraries"], 0);
}

#[actix_rt::test]
async fn test_trends_and_user_stats_follow_saved_itineraries() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let (token, user_id) = sign_up(&app, "stats@example.com").await;
    let (stranger, _) = sign_up(&app, "nosy@example.com").await;

    for (destination, budget, style) in [
        ("Paris", 1000, "leisure"),
        ("Paris", 2000, "cultural"),
        ("Rome", 600, "leisure"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/itinerary/save")
            .insert_header((header::AUTHORIZATION, token.clone()))
            .set_json(json!({
                "destination": destination,
                "budget": budget,
                "travel_style": style,
                "itinerary": { "days": [] }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get().uri("/api/analytics/trends").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["top_destinations"][0]["destination"], "Paris");
    assert_eq!(body["top_destinations"][0]["count"], 2);
    assert_eq!(body["top_destinations"][0]["avg_budget"], 1500.0);
    assert_eq!(body["budget_by_travel_style"][0]["travel_style"], "leisure");
    assert_eq!(body["budget_by_travel_style"][0]["avg_budget"], 800.0);

    let uri = format!("/api/analytics/user/{}/stats", user_id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["total_itineraries"], 3);
    assert_eq!(body["total_spent"], 3600.0);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, stranger))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);
}

#[actix_rt::test]
async fn test_warehouse_endpoints_wrap_data() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let (token, _) = sign_up(&app, "insights@example.com").await;

    for uri in [
        "/api/analytics/popular-destinations?limit=5",
        "/api/analytics/travel-style-stats",
        "/api/analytics/top-attractions",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["data"].is_array());
    }

    let req = test::TestRequest::get()
        .uri("/api/analytics/user-insights")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/analytics/user-insights")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_itineraries"], 0);
}
