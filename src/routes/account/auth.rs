use std::sync::OnceLock;

use actix_web::{web, HttpResponse};
use log::{info, warn};
use regex::Regex;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::analytics::AnalyticsEvent;
use crate::models::plan::TravelStyle;
use crate::models::user::{
    AuthResponse, LoginRequest, Preferences, SignupRequest, User, UserProfile,
};
use crate::services::analytics_service::record_detached;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;

pub async fn signup(
    state: web::Data<AppState>,
    input: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let input = input.into_inner();
    let email = normalize_email(input.email.as_deref());
    let (Some(email), Some(password)) = (email, input.password) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = bcrypt::hash(&password, state.config.bcrypt_cost).map_err(|e| {
        warn!("Password hashing failed: {}", e);
        ApiError::Internal("Failed to create user".to_string())
    })?;
    let name = input
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_name(&email));

    let user = state
        .users
        .create(User::new_traveler(email, Some(hash), name))
        .await?;
    let token = issue_token(&state, &user)?;
    info!("Registered user {}", user.email);

    record_registration(&state, &user);

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: user.into(),
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let input = input.into_inner();
    let email = normalize_email(input.email.as_deref());
    let (Some(email), Some(password)) = (email, input.password.filter(|p| !p.is_empty())) else {
        return Err(ApiError::bad_request("Email and password required"));
    };

    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state.users.find_by_email(&email).await?.ok_or_else(invalid)?;
    // Federated accounts carry no password hash
    let hash = user.password.as_deref().ok_or_else(invalid)?;
    if !bcrypt::verify(&password, hash).unwrap_or(false) {
        return Err(invalid());
    }

    let token = issue_token(&state, &user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.into(),
    }))
}

pub async fn me(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(&caller.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}

pub async fn update_preferences(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    input: web::Json<Preferences>,
) -> ApiResult<HttpResponse> {
    let mut preferences = input.into_inner();
    preferences.travel_style = preferences.travel_style.trim().to_lowercase();
    if TravelStyle::parse(&preferences.travel_style).is_none() {
        return Err(ApiError::bad_request("Invalid travel style"));
    }
    preferences.budget_currency = preferences.budget_currency.trim().to_uppercase();
    if preferences.budget_currency.is_empty() {
        return Err(ApiError::bad_request("budget_currency required"));
    }

    let user = state
        .users
        .update_preferences(&caller.user_id, &preferences)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Preferences updated",
        "user": UserProfile::from(user),
    })))
}

pub(crate) fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    state.tokens.issue(user).map_err(|e| {
        warn!("Token generation failed: {}", e);
        ApiError::Internal("Token generation failed".to_string())
    })
}

pub(crate) fn record_registration(state: &AppState, user: &User) {
    let Some(id) = user.id else {
        return;
    };
    record_detached(
        state.analytics.clone(),
        AnalyticsEvent::UserRegistered {
            user_id: id.to_hex(),
            email: user.email.clone(),
        },
    );
}

fn normalize_email(email: Option<&str>) -> Option<String> {
    email
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
}

fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+$",
            )
            .ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}
