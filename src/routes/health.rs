use actix_web::HttpResponse;
use serde_json::json;

const SERVICE: &str = "AI Travel Buddy Backend";

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "healthy", "service": SERVICE }))
}

pub async fn banner() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "itinerary": "/api/itinerary",
            "analytics": "/api/analytics",
            "maps": "/api/maps",
            "images": "/api/images",
        },
    }))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "Endpoint not found" }))
}
