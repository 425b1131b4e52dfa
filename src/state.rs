use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::config::AppConfig;
use crate::db::memory::{MemoryItineraryStore, MemoryUserStore};
use crate::db::mongo::{create_mongo_client, ensure_indexes};
use crate::db::mongo_store::{MongoItineraryStore, MongoUserStore};
use crate::db::store::{ItineraryStore, UserStore};
use crate::services::analytics_service::{
    AnalyticsSink, MemoryAnalyticsSink, MongoAnalyticsSink, NoopAnalyticsSink,
};
use crate::services::attraction_service::AttractionSource;
use crate::services::cache_service::TtlCache;
use crate::services::google_auth_service::{GoogleTokenInfoVerifier, IdTokenVerifier};
use crate::services::image_service::{ImageService, PexelsClient, PhotoSearch};
use crate::services::itinerary_generation_service::ItineraryComposer;
use crate::services::llm_service::{CompletionProvider, OpenAiProvider};
use crate::services::maps_service::MapsService;
use crate::services::token_service::TokenService;

const PHOTO_CACHE_CAPACITY: usize = 256;
const PHOTO_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cached photo bytes and their content type.
pub type PhotoCache = TtlCache<String, (Vec<u8>, String)>;

/// Long-lived services shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserStore>,
    pub itineraries: Arc<dyn ItineraryStore>,
    pub tokens: TokenService,
    pub composer: ItineraryComposer,
    pub images: Arc<ImageService>,
    pub maps: Arc<MapsService>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub id_tokens: Arc<dyn IdTokenVerifier>,
    pub photos: PhotoCache,
}

/// Replaceable collaborators. Unset fields are built from the configuration.
#[derive(Default)]
pub struct Overrides {
    pub users: Option<Arc<dyn UserStore>>,
    pub itineraries: Option<Arc<dyn ItineraryStore>>,
    pub analytics: Option<Arc<dyn AnalyticsSink>>,
    pub id_tokens: Option<Arc<dyn IdTokenVerifier>>,
    pub llm: Option<Arc<dyn CompletionProvider>>,
}

impl AppState {
    /// Connects to MongoDB when a URI is configured, otherwise keeps
    /// everything in memory.
    pub async fn from_config(config: AppConfig) -> mongodb::error::Result<Self> {
        let Some(uri) = config.mongodb_uri.clone() else {
            warn!("MONGODB_URI not set, using in-memory storage");
            return Ok(Self::in_memory(config));
        };

        let client = create_mongo_client(&uri).await?;
        let db = client.database(&config.mongodb_db_name);
        ensure_indexes(&db).await;
        info!("Using MongoDB database {}", config.mongodb_db_name);

        let analytics: Arc<dyn AnalyticsSink> = if config.analytics_enabled {
            Arc::new(MongoAnalyticsSink::new(
                &client.database(&config.analytics_db_name),
            ))
        } else {
            Arc::new(NoopAnalyticsSink)
        };

        Ok(Self::build(
            config,
            Overrides {
                users: Some(Arc::new(MongoUserStore::new(&db))),
                itineraries: Some(Arc::new(MongoItineraryStore::new(&db))),
                analytics: Some(analytics),
                ..Overrides::default()
            },
        ))
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::build(config, Overrides::default())
    }

    pub fn build(config: AppConfig, overrides: Overrides) -> Self {
        let search: Option<Arc<dyn PhotoSearch>> = config.pexels_api_key.clone().map(|key| {
            Arc::new(PexelsClient::new(key, config.pexels_api_url.clone())) as Arc<dyn PhotoSearch>
        });
        if search.is_none() {
            info!("PEXELS_API_KEY not set, attraction images use placeholders");
        }
        let images = Arc::new(ImageService::new(search));

        let maps = Arc::new(MapsService::new(
            config.nominatim_url.clone(),
            config.overpass_url.clone(),
            config.osrm_url.clone(),
        ));

        let llm = overrides.llm.or_else(|| {
            config.openai_api_key.clone().map(|key| {
                Arc::new(OpenAiProvider::new(
                    key,
                    config.openai_api_url.clone(),
                    config.openai_model.clone(),
                )) as Arc<dyn CompletionProvider>
            })
        });
        if llm.is_none() {
            info!("OPENAI_API_KEY not set, itineraries use the deterministic template");
        }

        let analytics: Arc<dyn AnalyticsSink> = match overrides.analytics {
            Some(sink) => sink,
            None if config.analytics_enabled => Arc::new(MemoryAnalyticsSink::new()),
            None => Arc::new(NoopAnalyticsSink),
        };

        let id_tokens: Arc<dyn IdTokenVerifier> = match overrides.id_tokens {
            Some(verifier) => verifier,
            None => Arc::new(GoogleTokenInfoVerifier::new(
                config.google_tokeninfo_url.clone(),
                config.google_client_id.clone(),
            )),
        };

        let users: Arc<dyn UserStore> = match overrides.users {
            Some(users) => users,
            None => Arc::new(MemoryUserStore::new()),
        };
        let itineraries: Arc<dyn ItineraryStore> = match overrides.itineraries {
            Some(itineraries) => itineraries,
            None => Arc::new(MemoryItineraryStore::new()),
        };

        Self {
            users,
            itineraries,
            tokens: TokenService::new(&config.jwt_secret, config.jwt_expiry_days),
            composer: ItineraryComposer::new(
                AttractionSource::standard(maps.clone(), images.clone()),
                llm,
            ),
            images,
            maps,
            analytics,
            id_tokens,
            photos: TtlCache::new(PHOTO_CACHE_CAPACITY, PHOTO_CACHE_TTL),
            config,
        }
    }
}
