use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    error::{ErrorKind, WriteError, WriteFailure},
    Collection, Database,
};

use crate::db::mongo::{ITINERARIES, USERS};
use crate::db::store::{ItineraryStore, StoreError, UserStore};
use crate::models::analytics::{
    DestinationTrend, ItineraryTotals, StyleBudget, TravelTrends, UserItineraryStats,
};
use crate::models::itinerary::{Itinerary, ItineraryStatus};
use crate::models::user::{Preferences, User};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create(&self, mut user: User) -> Result<User, StoreError> {
        match self.collection.insert_one(&user).await {
            Ok(result) => {
                user.id = result.inserted_id.as_object_id();
                Ok(user)
            }
            Err(err) if is_duplicate_key(&err) => {
                Err(StoreError::Duplicate("Email already registered".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn update_preferences(
        &self,
        id: &ObjectId,
        preferences: &Preferences,
    ) -> Result<Option<User>, StoreError> {
        let update = doc! {
            "$set": {
                "preferences": bson::to_bson(preferences)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };
        let result = self.collection.update_one(doc! { "_id": *id }, update).await?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn set_picture(&self, id: &ObjectId, picture: &str) -> Result<(), StoreError> {
        let update = doc! {
            "$set": {
                "picture": picture,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };
        self.collection.update_one(doc! { "_id": *id }, update).await?;
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self
            .collection
            .count_documents(doc! { "is_active": { "$ne": false } })
            .await?)
    }
}

pub struct MongoItineraryStore {
    collection: Collection<Itinerary>,
}

impl MongoItineraryStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ITINERARIES),
        }
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    async fn create(&self, mut itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        let result = self.collection.insert_one(&itinerary).await?;
        itinerary.id = result.inserted_id.as_object_id();
        Ok(itinerary)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Itinerary>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Itinerary>, StoreError> {
        let cursor = self
            .collection
            .find(doc! { "user_id": *owner })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn increment_views(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.collection
            .update_one(doc! { "_id": *id }, doc! { "$inc": { "views": 1 } })
            .await?;
        Ok(())
    }

    async fn increment_likes(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(doc! { "_id": *id }, doc! { "$inc": { "likes": 1 } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_status(
        &self,
        id: &ObjectId,
        status: ItineraryStatus,
    ) -> Result<bool, StoreError> {
        let update = doc! {
            "$set": {
                "status": bson::to_bson(&status)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };
        let result = self.collection.update_one(doc! { "_id": *id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId, owner: Option<&ObjectId>) -> Result<u64, StoreError> {
        let mut filter = doc! { "_id": *id };
        if let Some(owner) = owner {
            filter.insert("user_id", *owner);
        }
        Ok(self.collection.delete_one(filter).await?.deleted_count)
    }

    async fn trends(&self) -> Result<TravelTrends, StoreError> {
        let destinations = self
            .aggregate(vec![
                doc! { "$group": {
                    "_id": "$destination",
                    "count": { "$sum": 1 },
                    "avg_budget": { "$avg": "$budget.amount" },
                } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": 10 },
            ])
            .await?;

        let styles = self
            .aggregate(vec![
                doc! { "$group": {
                    "_id": "$travel_style",
                    "avg_budget": { "$avg": "$budget.amount" },
                    "count": { "$sum": 1 },
                } },
                doc! { "$sort": { "count": -1 } },
            ])
            .await?;

        Ok(TravelTrends {
            top_destinations: destinations
                .iter()
                .map(|row| DestinationTrend {
                    destination: text(row, "_id"),
                    count: number(row, "count") as i64,
                    avg_budget: number(row, "avg_budget"),
                })
                .collect(),
            budget_by_travel_style: styles
                .iter()
                .map(|row| StyleBudget {
                    travel_style: text(row, "_id"),
                    avg_budget: number(row, "avg_budget"),
                    count: number(row, "count") as i64,
                })
                .collect(),
        })
    }

    async fn totals(&self) -> Result<ItineraryTotals, StoreError> {
        let rows = self
            .aggregate(vec![doc! { "$group": {
                "_id": Bson::Null,
                "total_itineraries": { "$sum": 1 },
                "total_views": { "$sum": "$views" },
                "total_likes": { "$sum": "$likes" },
                "avg_budget": { "$avg": "$budget.amount" },
            } }])
            .await?;

        Ok(rows
            .first()
            .map(|row| ItineraryTotals {
                total_itineraries: number(row, "total_itineraries") as i64,
                total_views: number(row, "total_views") as i64,
                total_likes: number(row, "total_likes") as i64,
                avg_budget: number(row, "avg_budget"),
            })
            .unwrap_or_default())
    }

    async fn owner_stats(&self, owner: &ObjectId) -> Result<UserItineraryStats, StoreError> {
        let rows = self
            .aggregate(vec![
                doc! { "$match": { "user_id": *owner } },
                doc! { "$group": {
                    "_id": "$user_id",
                    "total_itineraries": { "$sum": 1 },
                    "total_spent": { "$sum": "$budget.amount" },
                    "avg_budget": { "$avg": "$budget.amount" },
                    "total_views": { "$sum": "$views" },
                    "total_likes": { "$sum": "$likes" },
                } },
            ])
            .await?;

        Ok(rows
            .first()
            .map(|row| UserItineraryStats {
                total_itineraries: number(row, "total_itineraries") as i64,
                total_spent: number(row, "total_spent"),
                avg_budget: number(row, "avg_budget"),
                total_views: number(row, "total_views") as i64,
                total_likes: number(row, "total_likes") as i64,
            })
            .unwrap_or_default())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) if *code == DUPLICATE_KEY
    )
}

// $sum yields Int32 or Int64 depending on magnitude, $avg yields Double or Null
fn number(row: &Document, key: &str) -> f64 {
    match row.get(key) {
        Some(Bson::Int32(value)) => f64::from(*value),
        Some(Bson::Int64(value)) => *value as f64,
        Some(Bson::Double(value)) => *value,
        _ => 0.0,
    }
}

fn text(row: &Document, key: &str) -> String {
    match row.get(key) {
        Some(Bson::String(value)) => value.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
