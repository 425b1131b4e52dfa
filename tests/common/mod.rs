#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use travel_buddy_api::config::AppConfig;
use travel_buddy_api::db::store::StoreError;
use travel_buddy_api::models::analytics::{
    AnalyticsEvent, PopularDestination, TopAttraction, TravelStyleStat, UserInsights,
};
use travel_buddy_api::models::user::{User, UserRole};
use travel_buddy_api::routes;
use travel_buddy_api::services::analytics_service::AnalyticsSink;
use travel_buddy_api::services::google_auth_service::{FederatedIdentity, IdTokenVerifier};
use travel_buddy_api::state::{AppState, Overrides};

pub const GOOGLE_TOKEN: &str = "valid-google-token";
pub const GOOGLE_EMAIL: &str = "explorer@gmail.com";
pub const GOOGLE_PICTURE: &str = "https://lh3.googleusercontent.com/a/explorer";

// Nothing listens on the discard port, so map lookups fail fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Accepts a single known token.
pub struct FakeGoogle;

#[async_trait]
impl IdTokenVerifier for FakeGoogle {
    async fn verify(&self, id_token: &str) -> Option<FederatedIdentity> {
        (id_token == GOOGLE_TOKEN).then(|| FederatedIdentity {
            email: GOOGLE_EMAIL.to_string(),
            name: Some("Explorer".to_string()),
            picture: Some(GOOGLE_PICTURE.to_string()),
        })
    }
}

/// Analytics warehouse that is always down.
pub struct FailingSink;

fn outage<T>() -> Result<T, StoreError> {
    Err(StoreError::Backend("analytics warehouse unavailable".to_string()))
}

#[async_trait]
impl AnalyticsSink for FailingSink {
    async fn record(&self, _event: AnalyticsEvent) -> Result<(), StoreError> {
        outage()
    }

    async fn popular_destinations(
        &self,
        _limit: usize,
    ) -> Result<Vec<PopularDestination>, StoreError> {
        outage()
    }

    async fn travel_style_stats(&self) -> Result<Vec<TravelStyleStat>, StoreError> {
        outage()
    }

    async fn user_insights(&self, _user_id: &str) -> Result<UserInsights, StoreError> {
        outage()
    }

    async fn top_attractions(&self, _limit: usize) -> Result<Vec<TopAttraction>, StoreError> {
        outage()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        nominatim_url: UNREACHABLE.to_string(),
        overpass_url: UNREACHABLE.to_string(),
        osrm_url: UNREACHABLE.to_string(),
        google_tokeninfo_url: UNREACHABLE.to_string(),
        ..AppConfig::default()
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_overrides(Overrides::default())
    }

    /// Wires `sink` in place of the in-memory analytics store.
    pub fn with_analytics(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self::with_overrides(Overrides {
            analytics: Some(sink),
            ..Overrides::default()
        })
    }

    fn with_overrides(overrides: Overrides) -> Self {
        let state = AppState::build(
            test_config(),
            Overrides {
                id_tokens: Some(Arc::new(FakeGoogle)),
                ..overrides
            },
        );
        Self {
            state: web::Data::new(state),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::configure)
    }

    /// Stores a user with `role` directly and returns a bearer header value.
    pub async fn user_with_role(&self, email: &str, role: UserRole) -> (String, String) {
        let mut user = User::new_traveler(email.to_string(), None, "Staff".to_string());
        user.role = role;
        let user = self.state.users.create(user).await.unwrap();
        let token = self.state.tokens.issue(&user).unwrap();
        (bearer(&token), user.id.unwrap().to_hex())
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Signs up through the API; returns the bearer header value and user id.
pub async fn sign_up<S, B>(app: &S, email: &str) -> (String, String)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": email, "password": "secret1", "name": "Tester" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "signup failed for {}", email);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    let id = body["user"]["_id"].as_str().unwrap().to_string();
    (bearer(&token), id)
}
