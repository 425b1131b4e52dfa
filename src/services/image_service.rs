use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::services::cache_service::TtlCache;
use crate::services::{http_client, UpstreamError, UpstreamResult};

const CACHE_CAPACITY: usize = 1024;
const CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const PLACEHOLDER_WIDTH: u32 = 400;
const PLACEHOLDER_HEIGHT: u32 = 300;

const GENERIC_PHRASES: [&str; 11] = [
    "Popular attraction in",
    "Culture and heritage in",
    "Scenic view in",
    "Historic architecture in",
    "Shopping and entertainment in",
    "Popular Attraction",
    "famous landmark",
    "cultural center",
    "scenic view",
    "historic monument",
    "shopping district",
];

const LANDMARK_KEYWORDS: [&str; 12] = [
    "temple", "fort", "palace", "mosque", "church", "monument", "museum", "park", "garden",
    "lake", "tower", "bridge",
];
const KEYWORD_ATTEMPTS: usize = 3;

/// Deterministic placeholder image for a query. Same text, same URL.
pub fn placeholder_image(query: &str, width: u32, height: u32) -> String {
    let compact: String = query.chars().filter(|c| !c.is_whitespace()).collect();
    let digest = Sha256::digest(compact.as_bytes());
    let seed: String = digest[..8].iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("https://picsum.photos/seed/{}/{}/{}", seed, width, height)
}

/// Photo search backend; returns the URL of the best rendition of the top hit.
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    async fn search(&self, query: &str) -> UpstreamResult<String>;
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsSources,
}

#[derive(Debug, Deserialize)]
struct PexelsSources {
    large2x: Option<String>,
    large: Option<String>,
    medium: Option<String>,
    original: Option<String>,
}

impl PexelsSources {
    fn best(self) -> Option<String> {
        self.large2x
            .or(self.large)
            .or(self.medium)
            .or(self.original)
            .filter(|url| !url.is_empty())
    }
}

pub struct PexelsClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl PexelsClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http: http_client(8),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl PhotoSearch for PexelsClient {
    async fn search(&self, query: &str) -> UpstreamResult<String> {
        let response = self
            .http
            .get(&self.api_url)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", "20"), ("orientation", "landscape")])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {}
            429 => return Err(UpstreamError::RateLimited),
            status => return Err(UpstreamError::Status(status)),
        }

        let body: PexelsResponse = response.json().await?;
        body.photos
            .into_iter()
            .next()
            .and_then(|photo| photo.src.best())
            .ok_or(UpstreamError::Empty)
    }
}

/// Resolves display images for attractions. Never fails: every miss ends in
/// a deterministic placeholder.
pub struct ImageService {
    search: Option<Arc<dyn PhotoSearch>>,
    cache: TtlCache<String, String>,
}

impl ImageService {
    pub fn new(search: Option<Arc<dyn PhotoSearch>>) -> Self {
        Self {
            search,
            cache: TtlCache::new(CACHE_CAPACITY, CACHE_TTL),
        }
    }

    pub fn placeholder_only() -> Self {
        Self::new(None)
    }

    pub async fn resolve(&self, name: &str, destination: Option<&str>) -> String {
        let key = format!("{}_{}", name, destination.unwrap_or_default()).to_lowercase();
        if let Some(url) = self.cache.get(&key) {
            return url;
        }

        let url = match &self.search {
            Some(search) => self.search_strategies(search.as_ref(), name, destination).await,
            None => None,
        }
        .unwrap_or_else(|| {
            debug!("Using placeholder image for '{}'", name);
            placeholder_image(name, PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
        });

        self.cache.insert(key, url.clone());
        url
    }

    async fn search_strategies(
        &self,
        search: &dyn PhotoSearch,
        name: &str,
        destination: Option<&str>,
    ) -> Option<String> {
        for query in search_queries(name, destination) {
            match search.search(&query).await {
                Ok(url) => {
                    info!("Found image for '{}' with query '{}'", name, query);
                    return Some(url);
                }
                Err(UpstreamError::Empty) => debug!("No photo for '{}'", query),
                Err(e) => warn!("Photo search failed for '{}': {}", query, e),
            }
        }
        None
    }
}

fn clean_query(name: &str) -> String {
    let mut query = name.trim().to_string();
    for phrase in GENERIC_PHRASES {
        query = query.replace(phrase, "").trim().to_string();
    }
    query
}

/// Search queries in the order they are tried.
fn search_queries(name: &str, destination: Option<&str>) -> Vec<String> {
    let query = clean_query(name);
    let destination = destination.map(str::trim).filter(|d| !d.is_empty());
    let mut queries = Vec::new();

    if let Some(destination) = destination {
        queries.push(format!("{} {}", query, destination).trim().to_string());
    }
    queries.push(query.clone());

    let lowered = query.to_lowercase();
    if !LANDMARK_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        for keyword in &LANDMARK_KEYWORDS[..KEYWORD_ATTEMPTS] {
            queries.push(format!("{} {}", query, keyword).trim().to_string());
        }
    }

    if let Some(destination) = destination {
        queries.push(destination.to_string());
    }

    queries.retain(|q| !q.is_empty());
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSearch {
        hit: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PhotoSearch for ScriptedSearch {
        async fn search(&self, query: &str) -> UpstreamResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query == self.hit {
                Ok(format!("https://images.test/{}", query.replace(' ', "-")))
            } else {
                Err(UpstreamError::RateLimited)
            }
        }
    }

    #[actix_rt::test]
    async fn placeholder_is_stable_per_name() {
        let images = ImageService::placeholder_only();
        let first = images.resolve("Eiffel Tower", Some("Paris")).await;
        let again = ImageService::placeholder_only()
            .resolve("Eiffel Tower", Some("Paris"))
            .await;
        let other = images.resolve("Louvre Museum", Some("Paris")).await;

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert!(first.starts_with("https://picsum.photos/seed/"));
        assert!(first.ends_with("/400/300"));
    }

    #[test]
    fn keyword_strategy_is_skipped_for_named_landmarks() {
        assert_eq!(
            search_queries("Tokyo Tower", Some("Tokyo")),
            vec!["Tokyo Tower Tokyo", "Tokyo Tower", "Tokyo"]
        );
        assert_eq!(
            search_queries("Charminar", None),
            vec!["Charminar", "Charminar temple", "Charminar fort", "Charminar palace"]
        );
    }

    #[test]
    fn generic_phrases_are_stripped() {
        assert_eq!(clean_query("Popular attraction in Lisbon"), "Lisbon");
    }

    #[actix_rt::test]
    async fn later_strategies_are_tried_after_failures_and_cached() {
        let search = Arc::new(ScriptedSearch {
            hit: "Charminar fort",
            calls: AtomicUsize::new(0),
        });
        let images = ImageService::new(Some(search.clone()));

        let url = images.resolve("Charminar", Some("Hyderabad")).await;
        assert_eq!(url, "https://images.test/Charminar-fort");
        assert_eq!(search.calls.load(Ordering::SeqCst), 4);

        images.resolve("Charminar", Some("Hyderabad")).await;
        assert_eq!(search.calls.load(Ordering::SeqCst), 4);
    }

    #[actix_rt::test]
    async fn exhausted_strategies_fall_back_to_placeholder() {
        let search = Arc::new(ScriptedSearch {
            hit: "never",
            calls: AtomicUsize::new(0),
        });
        let url = ImageService::new(Some(search))
            .resolve("Colosseum", Some("Rome"))
            .await;
        assert_eq!(url, placeholder_image("Colosseum", 400, 300));
    }
}
