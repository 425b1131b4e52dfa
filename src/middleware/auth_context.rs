use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::middleware::auth::authenticate;
use crate::models::user::UserRole;
use crate::services::token_service::Claims;
use crate::state::AppState;

/// Caller identity. Taken from the claims left by `AuthMiddleware`, or
/// decoded from the bearer header on routes that share a path with public ones.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    fn from_claims(claims: &Claims) -> Result<Self, ApiError> {
        let user_id = claims
            .user_object_id()
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            return ready(AuthenticatedUser::from_claims(claims));
        }

        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => authenticate(req.headers(), &state.tokens)
                .and_then(|claims| AuthenticatedUser::from_claims(&claims)),
            None => Err(ApiError::Internal("Application state missing".to_string())),
        };
        ready(result)
    }
}
