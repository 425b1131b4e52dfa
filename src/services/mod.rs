pub mod analytics_service;
pub mod attraction_service;
pub mod cache_service;
pub mod google_auth_service;
pub mod image_service;
pub mod itinerary_generation_service;
pub mod llm_service;
pub mod maps_service;
pub mod token_service;

use thiserror::Error;

/// Failure talking to a third-party provider. Never reaches a client;
/// callers log it and fall back.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("rate limited")]
    RateLimited,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no result")]
    Empty,
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent("TravelBuddy/1.0")
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to a default HTTP client: {}", e);
            reqwest::Client::new()
        })
}
