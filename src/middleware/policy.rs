use mongodb::bson::oid::ObjectId;

use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadUserItineraries,
    ReadUserStats,
    ChangeItineraryStatus,
    DeleteItinerary,
    ReadPlatformStats,
}

pub fn is_elevated(role: UserRole) -> bool {
    matches!(role, UserRole::Admin | UserRole::SuperAdmin)
}

/// Single authorization rule for every handler. `owner` is the user that
/// owns the resource, when the action targets one.
pub fn can(actor: &AuthenticatedUser, action: Action, owner: Option<&ObjectId>) -> bool {
    if is_elevated(actor.role) {
        return true;
    }
    match action {
        Action::ReadPlatformStats => false,
        Action::ReadUserItineraries
        | Action::ReadUserStats
        | Action::ChangeItineraryStatus
        | Action::DeleteItinerary => owner == Some(&actor.user_id),
    }
}

pub fn authorize(
    actor: &AuthenticatedUser,
    action: Action,
    owner: Option<&ObjectId>,
) -> Result<(), ApiError> {
    if can(actor, action, owner) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Unauthorized"))
    }
}
