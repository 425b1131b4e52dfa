mod common;

use actix_web::test;
use serde_json::Value;

use common::TestApp;

#[actix_rt::test]
async fn test_health_and_banner() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in ["/health", "/api/health"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["endpoints"]["itinerary"], "/api/itinerary");
}

#[actix_rt::test]
async fn test_unknown_routes_are_json_404s() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in ["/nowhere", "/api/nowhere"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Endpoint not found");
    }
}

#[actix_rt::test]
async fn test_landmark_images_are_deterministic_without_a_provider() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let mut urls = Vec::new();
    for name in ["Charminar", "Charminar", "Golconda%20Fort"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/images/landmark?name={}&destination=Hyderabad", name))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["destination"], "Hyderabad");
        let url = body["image_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("https://picsum.photos/seed/"));
        urls.push(url);
    }
    assert_eq!(urls[0], urls[1]);
    assert_ne!(urls[0], urls[2]);

    let req = test::TestRequest::get()
        .uri("/api/images/landmark?destination=Hyderabad")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Landmark name required");
}

#[actix_rt::test]
async fn test_nearby_attractions_fall_back_from_curated_to_samples() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/maps/nearby-attractions?location=Rome")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["source"], "curated");
    assert_eq!(body["attractions"][0]["name"], "Colosseum");
    assert!(body["attractions"][0]["type"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/maps/nearby-attractions?location=Atlantis&radius=2000")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["source"], "sample");
    assert_eq!(body["attractions"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri("/api/maps/nearby-attractions")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/maps/nearby-attractions?location=Rome&radius=wide")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_maps_degrade_when_upstreams_are_down() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/maps/geocode?address=Paris")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Location not found");

    let req = test::TestRequest::get()
        .uri("/api/maps/distance?origin=Paris&destination=Versailles")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["distance"], "5.2 km");
    assert_eq!(body["duration_value"], 900);

    let req = test::TestRequest::get()
        .uri("/api/maps/distance?origin=Paris")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_place_details_and_photo_validation() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/maps/place-details?place_id=osm_123")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["name"], "Point of Interest");

    let req = test::TestRequest::get()
        .uri("/api/maps/place-details")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get().uri("/api/maps/photo").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_photo_widths_are_clamped() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    assert!(test_app.state.photos.is_empty());
    test_app.state.photos.insert(
        "photo::abc::w1600".to_string(),
        (b"cached-bytes".to_vec(), "image/png".to_string()),
    );
    assert_eq!(test_app.state.photos.len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/maps/photo?photo_reference=abc&maxwidth=4294967295")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(actix_web::http::header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"cached-bytes");
}
