use std::env;

use log::warn;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8000;
const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
const JWT_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub mongodb_db_name: String,
    pub analytics_db_name: String,
    pub analytics_enabled: bool,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub bcrypt_cost: u32,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    pub pexels_api_key: Option<String>,
    pub pexels_api_url: String,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
    pub nominatim_url: String,
    pub overpass_url: String,
    pub osrm_url: String,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongodb_uri: None,
            mongodb_db_name: "travelbuddy".to_string(),
            analytics_db_name: "travelbuddy_analytics".to_string(),
            analytics_enabled: true,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiry_days: JWT_EXPIRY_DAYS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            pexels_api_key: None,
            pexels_api_url: "https://api.pexels.com/v1/search".to_string(),
            google_client_id: None,
            google_tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            osrm_url: "https://router.project-osrm.org/route/v1/driving".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Reads the process environment, falling back to development defaults.
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let jwt_secret = match non_empty("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let cors_origins = non_empty("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            mongodb_uri: non_empty("MONGODB_URI"),
            mongodb_db_name: non_empty("MONGODB_DB_NAME").unwrap_or(defaults.mongodb_db_name),
            analytics_db_name: non_empty("ANALYTICS_DB_NAME")
                .unwrap_or(defaults.analytics_db_name),
            analytics_enabled: parsed("ANALYTICS_ENABLED").unwrap_or(defaults.analytics_enabled),
            jwt_secret,
            jwt_expiry_days: parsed("JWT_EXPIRY_DAYS").unwrap_or(defaults.jwt_expiry_days),
            bcrypt_cost: parsed("BCRYPT_COST").unwrap_or(defaults.bcrypt_cost),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_api_url: non_empty("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            pexels_api_key: non_empty("PEXELS_API_KEY"),
            pexels_api_url: non_empty("PEXELS_API_URL").unwrap_or(defaults.pexels_api_url),
            google_client_id: non_empty("GOOGLE_CLIENT_ID"),
            google_tokeninfo_url: non_empty("GOOGLE_TOKENINFO_URL")
                .unwrap_or(defaults.google_tokeninfo_url),
            nominatim_url: non_empty("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            overpass_url: non_empty("OVERPASS_URL").unwrap_or(defaults.overpass_url),
            osrm_url: non_empty("OSRM_URL").unwrap_or(defaults.osrm_url),
            cors_origins,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty(key).and_then(|value| value.parse().ok())
}
