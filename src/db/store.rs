use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::analytics::{ItineraryTotals, TravelTrends, UserItineraryStats};
use crate::models::itinerary::{Itinerary, ItineraryStatus};
use crate::models::user::{Preferences, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Duplicate(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("database error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user and returns it with its assigned id. Emails are unique.
    async fn create(&self, user: User) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;
    async fn update_preferences(
        &self,
        id: &ObjectId,
        preferences: &Preferences,
    ) -> Result<Option<User>, StoreError>;
    async fn set_picture(&self, id: &ObjectId, picture: &str) -> Result<(), StoreError>;
    async fn count_active(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn create(&self, itinerary: Itinerary) -> Result<Itinerary, StoreError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Itinerary>, StoreError>;
    /// Newest first.
    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Itinerary>, StoreError>;
    async fn increment_views(&self, id: &ObjectId) -> Result<(), StoreError>;
    /// Returns false when no itinerary matched.
    async fn increment_likes(&self, id: &ObjectId) -> Result<bool, StoreError>;
    async fn update_status(
        &self,
        id: &ObjectId,
        status: ItineraryStatus,
    ) -> Result<bool, StoreError>;
    /// Deletes by id, restricted to `owner` when given. Returns the deleted count.
    async fn delete(&self, id: &ObjectId, owner: Option<&ObjectId>) -> Result<u64, StoreError>;
    async fn trends(&self) -> Result<TravelTrends, StoreError>;
    async fn totals(&self) -> Result<ItineraryTotals, StoreError>;
    async fn owner_stats(&self, owner: &ObjectId) -> Result<UserItineraryStats, StoreError>;
}
