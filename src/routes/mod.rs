use actix_web::{web, Scope};

use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;

pub mod account;
pub mod analytics;
pub mod health;
pub mod images;
pub mod itinerary;
pub mod maps;

/// Mounts every route of the service. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .route("/", web::get().to(health::banner))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(auth_routes())
            .service(itinerary_routes())
            .service(maps_routes())
            .service(analytics_routes())
            .service(
                web::scope("/images").route("/landmark", web::get().to(images::landmark)),
            ),
    )
    .default_service(web::to(health::not_found));
}

fn auth_routes() -> Scope {
    web::scope("/auth")
        .route("/signup", web::post().to(account::signup))
        .route("/login", web::post().to(account::login))
        .route("/google", web::post().to(account::google_signin))
        // Protected routes
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .route("/me", web::get().to(account::me))
                .route("/preferences", web::put().to(account::update_preferences)),
        )
}

fn itinerary_routes() -> Scope {
    // Handlers that need a caller take `AuthenticatedUser`, which rejects
    // missing or invalid tokens; `GET /{id}` stays public.
    web::scope("/itinerary")
        .route("/generate", web::post().to(itinerary::generate))
        .route("/generate-public", web::post().to(itinerary::generate_public))
        .route("/save", web::post().to(itinerary::save))
        .route("/user/{user_id}", web::get().to(itinerary::user_itineraries))
        .route("/{id}/status", web::put().to(itinerary::update_status))
        .route("/{id}/like", web::post().to(itinerary::like))
        .service(
            web::resource("/{id}")
                .route(web::get().to(itinerary::get_by_id))
                .route(web::delete().to(itinerary::delete)),
        )
}

fn maps_routes() -> Scope {
    web::scope("/maps")
        .route("/nearby-attractions", web::get().to(maps::nearby_attractions))
        .route("/place-details", web::get().to(maps::place_details))
        .route("/photo", web::get().to(maps::photo))
        .route("/geocode", web::get().to(maps::geocode))
        .route("/distance", web::get().to(maps::distance))
}

fn analytics_routes() -> Scope {
    web::scope("/analytics")
        .route("/trends", web::get().to(analytics::trends))
        .route(
            "/popular-destinations",
            web::get().to(analytics::popular_destinations),
        )
        .route(
            "/travel-style-stats",
            web::get().to(analytics::travel_style_stats),
        )
        .route("/top-attractions", web::get().to(analytics::top_attractions))
        // Protected routes
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .route("/stats", web::get().to(analytics::platform_stats))
                .route("/user-insights", web::get().to(analytics::user_insights))
                .route("/user/{user_id}/stats", web::get().to(analytics::user_stats)),
        )
}
