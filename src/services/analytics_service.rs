use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{debug, warn};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Collection, Database};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::db::store::StoreError;
use crate::models::analytics::{
    AnalyticsEvent, PopularDestination, TopAttraction, TravelStyleStat, UserInsights,
};

/// Best-effort analytical store. Writes may be dropped; reads may be empty.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), StoreError>;
    async fn popular_destinations(&self, limit: usize)
        -> Result<Vec<PopularDestination>, StoreError>;
    async fn travel_style_stats(&self) -> Result<Vec<TravelStyleStat>, StoreError>;
    async fn user_insights(&self, user_id: &str) -> Result<UserInsights, StoreError>;
    async fn top_attractions(&self, limit: usize) -> Result<Vec<TopAttraction>, StoreError>;
}

/// Records `event` on a background task. Failures are logged and dropped.
pub fn record_detached(sink: Arc<dyn AnalyticsSink>, event: AnalyticsEvent) {
    actix_web::rt::spawn(async move {
        let kind = event.kind();
        match sink.record(event).await {
            Ok(()) => debug!("Recorded {} event", kind),
            Err(e) => warn!("Dropped {} analytics event: {}", kind, e),
        }
    });
}

pub struct NoopAnalyticsSink;

#[async_trait]
impl AnalyticsSink for NoopAnalyticsSink {
    async fn record(&self, _event: AnalyticsEvent) -> Result<(), StoreError> {
        Ok(())
    }

    async fn popular_destinations(
        &self,
        _limit: usize,
    ) -> Result<Vec<PopularDestination>, StoreError> {
        Ok(Vec::new())
    }

    async fn travel_style_stats(&self) -> Result<Vec<TravelStyleStat>, StoreError> {
        Ok(Vec::new())
    }

    async fn user_insights(&self, _user_id: &str) -> Result<UserInsights, StoreError> {
        Ok(UserInsights::default())
    }

    async fn top_attractions(&self, _limit: usize) -> Result<Vec<TopAttraction>, StoreError> {
        Ok(Vec::new())
    }
}

const ITINERARIES: &str = "itineraries";
const ATTRACTIONS: &str = "attractions";
const USER_ANALYTICS: &str = "user_analytics";
const USERS: &str = "users";

/// Analytics rows written to a dedicated MongoDB database.
pub struct MongoAnalyticsSink {
    itineraries: Collection<Document>,
    attractions: Collection<Document>,
    user_analytics: Collection<Document>,
    users: Collection<Document>,
}

impl MongoAnalyticsSink {
    pub fn new(db: &Database) -> Self {
        Self {
            itineraries: db.collection(ITINERARIES),
            attractions: db.collection(ATTRACTIONS),
            user_analytics: db.collection(USER_ANALYTICS),
            users: db.collection(USERS),
        }
    }

    async fn aggregate(
        collection: &Collection<Document>,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = collection.aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl AnalyticsSink for MongoAnalyticsSink {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), StoreError> {
        let now = bson::DateTime::now();
        let (collection, row) = match event {
            AnalyticsEvent::UserRegistered { user_id, email } => (
                &self.users,
                doc! { "user_id": user_id, "email": email, "created_at": now, "updated_at": now },
            ),
            AnalyticsEvent::ItineraryCreated {
                itinerary_id,
                user_id,
                destination,
                budget,
                days,
                travel_style,
                total_cost,
            } => (
                &self.itineraries,
                doc! {
                    "itinerary_id": itinerary_id,
                    "user_id": user_id,
                    "destination": destination,
                    "budget": budget,
                    "days": i64::from(days),
                    "travel_style": travel_style,
                    "total_cost": total_cost,
                    "created_at": now,
                    "updated_at": now,
                },
            ),
            AnalyticsEvent::AttractionListed {
                itinerary_id,
                name,
                description,
                day,
                rating,
                image_url,
            } => (
                &self.attractions,
                doc! {
                    "attraction_id": Uuid::new_v4().to_string(),
                    "itinerary_id": itinerary_id,
                    "name": name,
                    "description": description,
                    "day": i64::from(day),
                    "rating": rating,
                    "image_url": image_url,
                    "created_at": now,
                },
            ),
            AnalyticsEvent::Usage {
                user_id,
                event_type,
                destination,
                metadata,
            } => (
                &self.user_analytics,
                doc! {
                    "event_id": Uuid::new_v4().to_string(),
                    "user_id": user_id,
                    "event_type": event_type,
                    "destination": destination,
                    "metadata": metadata.map(|m| m.to_string()),
                    "created_at": now,
                },
            ),
        };

        collection.insert_one(row).await?;
        Ok(())
    }

    async fn popular_destinations(
        &self,
        limit: usize,
    ) -> Result<Vec<PopularDestination>, StoreError> {
        let rows = Self::aggregate(
            &self.itineraries,
            vec![
                doc! { "$group": { "_id": "$destination", "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1 } },
                doc! { "$limit": limit as i64 },
            ],
        )
        .await?;

        Ok(rows
            .iter()
            .map(|row| PopularDestination {
                destination: text(row, "_id"),
                count: number(row, "count") as i64,
            })
            .collect())
    }

    async fn travel_style_stats(&self) -> Result<Vec<TravelStyleStat>, StoreError> {
        let rows = Self::aggregate(
            &self.itineraries,
            vec![
                doc! { "$group": {
                    "_id": "$travel_style",
                    "count": { "$sum": 1 },
                    "avg_budget": { "$avg": "$budget" },
                    "avg_cost": { "$avg": "$total_cost" },
                } },
                doc! { "$sort": { "_id": 1 } },
            ],
        )
        .await?;

        Ok(rows
            .iter()
            .map(|row| TravelStyleStat {
                travel_style: text(row, "_id"),
                count: number(row, "count") as i64,
                avg_budget: number(row, "avg_budget"),
                avg_cost: number(row, "avg_cost"),
            })
            .collect())
    }

    async fn user_insights(&self, user_id: &str) -> Result<UserInsights, StoreError> {
        let rows = Self::aggregate(
            &self.itineraries,
            vec![
                doc! { "$match": { "user_id": user_id } },
                doc! { "$group": {
                    "_id": Bson::Null,
                    "itineraries": { "$addToSet": "$itinerary_id" },
                    "destinations": { "$addToSet": "$destination" },
                    "avg_budget": { "$avg": "$budget" },
                    "total_spent": { "$sum": "$total_cost" },
                    "last_itinerary": { "$max": "$created_at" },
                } },
                doc! { "$project": {
                    "total_itineraries": { "$size": "$itineraries" },
                    "unique_destinations": { "$size": "$destinations" },
                    "avg_budget": 1,
                    "total_spent": 1,
                    "last_itinerary": 1,
                } },
            ],
        )
        .await?;

        Ok(rows
            .first()
            .map(|row| UserInsights {
                total_itineraries: number(row, "total_itineraries") as i64,
                unique_destinations: number(row, "unique_destinations") as i64,
                avg_budget: number(row, "avg_budget"),
                total_spent: number(row, "total_spent"),
                last_itinerary: row
                    .get_datetime("last_itinerary")
                    .ok()
                    .and_then(|at| at.try_to_rfc3339_string().ok()),
            })
            .unwrap_or_default())
    }

    async fn top_attractions(&self, limit: usize) -> Result<Vec<TopAttraction>, StoreError> {
        let rows = Self::aggregate(
            &self.attractions,
            vec![
                doc! { "$group": {
                    "_id": "$name",
                    "appearances": { "$sum": 1 },
                    "avg_rating": { "$avg": "$rating" },
                } },
                doc! { "$sort": { "appearances": -1 } },
                doc! { "$limit": limit as i64 },
            ],
        )
        .await?;

        Ok(rows
            .iter()
            .map(|row| TopAttraction {
                name: text(row, "_id"),
                appearances: number(row, "appearances") as i64,
                avg_rating: number(row, "avg_rating"),
            })
            .collect())
    }
}

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
        _ => String::new(),
    }
}

const MEMORY_SINK_CAPACITY: usize = 10_000;

/// Keeps the most recent events in process memory. Used when no MongoDB is
/// configured.
pub struct MemoryAnalyticsSink {
    events: RwLock<VecDeque<(AnalyticsEvent, DateTime<Utc>)>>,
    capacity: usize,
}

impl Default for MemoryAnalyticsSink {
    fn default() -> Self {
        Self::with_capacity(MEMORY_SINK_CAPACITY)
    }
}

impl MemoryAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.read().iter().map(|(event, _)| event.clone()).collect()
    }

    fn created(&self) -> Vec<CreatedRow> {
        self.events
            .read()
            .iter()
            .filter_map(|(event, _)| match event {
                AnalyticsEvent::ItineraryCreated {
                    destination,
                    budget,
                    travel_style,
                    total_cost,
                    ..
                } => Some(CreatedRow {
                    destination: destination.clone(),
                    budget: *budget,
                    travel_style: travel_style.clone(),
                    total_cost: *total_cost,
                }),
                _ => None,
            })
            .collect()
    }
}

struct CreatedRow {
    destination: String,
    budget: f64,
    travel_style: String,
    total_cost: f64,
}

fn ranked<K: Ord>(counts: BTreeMap<K, i64>, limit: usize) -> Vec<(K, i64)> {
    let mut rows: Vec<(K, i64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(limit);
    rows
}

#[async_trait]
impl AnalyticsSink for MemoryAnalyticsSink {
    async fn record(&self, event: AnalyticsEvent) -> Result<(), StoreError> {
        let mut events = self.events.write();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back((event, Utc::now()));
        Ok(())
    }

    async fn popular_destinations(
        &self,
        limit: usize,
    ) -> Result<Vec<PopularDestination>, StoreError> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for row in self.created() {
            *counts.entry(row.destination).or_default() += 1;
        }
        Ok(ranked(counts, limit)
            .into_iter()
            .map(|(destination, count)| PopularDestination { destination, count })
            .collect())
    }

    async fn travel_style_stats(&self) -> Result<Vec<TravelStyleStat>, StoreError> {
        let mut groups: BTreeMap<String, (i64, f64, f64)> = BTreeMap::new();
        for row in self.created() {
            let group = groups.entry(row.travel_style).or_default();
            group.0 += 1;
            group.1 += row.budget;
            group.2 += row.total_cost;
        }
        Ok(groups
            .into_iter()
            .map(|(travel_style, (count, budgets, costs))| TravelStyleStat {
                travel_style,
                count,
                avg_budget: budgets / count as f64,
                avg_cost: costs / count as f64,
            })
            .collect())
    }

    async fn user_insights(&self, user_id: &str) -> Result<UserInsights, StoreError> {
        let events = self.events.read();
        let mut itineraries = BTreeSet::new();
        let mut destinations = BTreeSet::new();
        let mut budgets = Vec::new();
        let mut total_spent = 0.0;
        let mut last: Option<DateTime<Utc>> = None;

        for (event, at) in events.iter() {
            if let AnalyticsEvent::ItineraryCreated {
                itinerary_id,
                user_id: owner,
                destination,
                budget,
                total_cost,
                ..
            } = event
            {
                if owner != user_id {
                    continue;
                }
                itineraries.insert(itinerary_id.clone());
                destinations.insert(destination.clone());
                budgets.push(*budget);
                total_spent += total_cost;
                last = last.max(Some(*at));
            }
        }

        if budgets.is_empty() {
            return Ok(UserInsights::default());
        }
        Ok(UserInsights {
            total_itineraries: itineraries.len() as i64,
            unique_destinations: destinations.len() as i64,
            avg_budget: budgets.iter().sum::<f64>() / budgets.len() as f64,
            total_spent,
            last_itinerary: last.map(|at| at.to_rfc3339()),
        })
    }

    async fn top_attractions(&self, limit: usize) -> Result<Vec<TopAttraction>, StoreError> {
        let mut groups: BTreeMap<String, (i64, f64, i64)> = BTreeMap::new();
        for (event, _) in self.events.read().iter() {
            if let AnalyticsEvent::AttractionListed { name, rating, .. } = event {
                let group = groups.entry(name.clone()).or_default();
                group.0 += 1;
                if let Some(rating) = rating {
                    group.1 += rating;
                    group.2 += 1;
                }
            }
        }

        let mut rows: Vec<TopAttraction> = groups
            .into_iter()
            .map(|(name, (appearances, ratings, rated))| TopAttraction {
                name,
                appearances,
                avg_rating: if rated == 0 { 0.0 } else { ratings / rated as f64 },
            })
            .collect();
        rows.sort_by(|a, b| b.appearances.cmp(&a.appearances));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: &str, user: &str, destination: &str, style: &str, budget: f64) -> AnalyticsEvent {
        AnalyticsEvent::ItineraryCreated {
            itinerary_id: id.to_string(),
            user_id: user.to_string(),
            destination: destination.to_string(),
            budget,
            days: 3,
            travel_style: style.to_string(),
            total_cost: budget,
        }
    }

    fn listed(name: &str, rating: Option<f64>) -> AnalyticsEvent {
        AnalyticsEvent::AttractionListed {
            itinerary_id: "it".to_string(),
            name: name.to_string(),
            description: String::new(),
            day: 1,
            rating,
            image_url: String::new(),
        }
    }

    #[actix_rt::test]
    async fn memory_sink_answers_warehouse_queries() {
        let sink = MemoryAnalyticsSink::new();
        for event in [
            created("1", "u1", "Paris", "leisure", 1000.0),
            created("2", "u1", "Rome", "cultural", 600.0),
            created("3", "u2", "Paris", "leisure", 2000.0),
            listed("Colosseum", Some(4.0)),
            listed("Colosseum", None),
            listed("Pantheon", Some(5.0)),
        ] {
            sink.record(event).await.unwrap();
        }

        let popular = sink.popular_destinations(1).await.unwrap();
        assert_eq!(popular, vec![PopularDestination { destination: "Paris".to_string(), count: 2 }]);

        let styles = sink.travel_style_stats().await.unwrap();
        let leisure = styles.iter().find(|s| s.travel_style == "leisure").unwrap();
        assert_eq!(leisure.count, 2);
        assert_eq!(leisure.avg_budget, 1500.0);

        let insights = sink.user_insights("u1").await.unwrap();
        assert_eq!(insights.total_itineraries, 2);
        assert_eq!(insights.unique_destinations, 2);
        assert_eq!(insights.total_spent, 1600.0);
        assert!(insights.last_itinerary.is_some());

        let top = sink.top_attractions(10).await.unwrap();
        assert_eq!(top[0].name, "Colosseum");
        assert_eq!(top[0].appearances, 2);
        assert_eq!(top[0].avg_rating, 4.0);
    }

    #[actix_rt::test]
    async fn memory_sink_keeps_only_the_latest_events() {
        let sink = MemoryAnalyticsSink::with_capacity(2);
        for name in ["Louvre", "Orsay", "Pompidou"] {
            sink.record(listed(name, None)).await.unwrap();
        }

        let names: Vec<String> = sink
            .events()
            .into_iter()
            .filter_map(|event| match event {
                AnalyticsEvent::AttractionListed { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["Orsay".to_string(), "Pompidou".to_string()]);
    }

    #[actix_rt::test]
    async fn unknown_users_have_empty_insights() {
        let sink = MemoryAnalyticsSink::new();
        assert_eq!(sink.user_insights("nobody").await.unwrap(), UserInsights::default());
    }
}
