pub mod analytics;
pub mod attraction;
pub mod google_auth;
pub mod itinerary;
pub mod maps;
pub mod plan;
pub mod user;
