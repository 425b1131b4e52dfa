use actix_web::{web, HttpResponse};
use log::info;

use crate::error::{ApiError, ApiResult};
use crate::models::google_auth::GoogleSignInRequest;
use crate::models::user::{AuthResponse, User};
use crate::routes::account::auth::{issue_token, record_registration};
use crate::services::google_auth_service::FederatedIdentity;
use crate::state::AppState;

const PROVIDER: &str = "google";

/// Signs in with a Google ID token, creating the account on first use.
pub async fn google_signin(
    state: web::Data<AppState>,
    input: web::Json<GoogleSignInRequest>,
) -> ApiResult<HttpResponse> {
    let id_token = input
        .into_inner()
        .id_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("id_token required"))?;

    let identity = state
        .id_tokens
        .verify(id_token.trim())
        .await
        .ok_or_else(|| ApiError::bad_request("Invalid Google ID token"))?;

    let user = upsert_user(&state, identity).await?;
    let token = issue_token(&state, &user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Google sign-in successful".to_string(),
        token,
        user: user.into(),
    }))
}

async fn upsert_user(state: &AppState, identity: FederatedIdentity) -> ApiResult<User> {
    if let Some(mut existing) = state.users.find_by_email(&identity.email).await? {
        // backfill only; never overwrite a picture the user already has
        if existing.picture.is_none() {
            if let (Some(picture), Some(id)) = (identity.picture, existing.id) {
                state.users.set_picture(&id, &picture).await?;
                existing.picture = Some(picture);
            }
        }
        return Ok(existing);
    }

    let name = identity.name.unwrap_or_else(|| identity.email.clone());
    let mut user = User::new_traveler(identity.email, None, name);
    user.picture = identity.picture;
    user.auth_provider = Some(PROVIDER.to_string());

    let user = state.users.create(user).await?;
    info!("Registered federated user {}", user.email);
    record_registration(state, &user);
    Ok(user)
}
