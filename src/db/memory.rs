use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;

use crate::db::store::{ItineraryStore, StoreError, UserStore};
use crate::models::analytics::{
    DestinationTrend, ItineraryTotals, StyleBudget, TravelTrends, UserItineraryStats,
};
use crate::models::itinerary::{Itinerary, ItineraryStatus};
use crate::models::user::{Preferences, User};

/// Process-local user store used when no MongoDB URI is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<ObjectId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate("Email already registered".to_string()));
        }
        let id = user.id.unwrap_or_else(ObjectId::new);
        user.id = Some(id);
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn update_preferences(
        &self,
        id: &ObjectId,
        preferences: &Preferences,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write();
        Ok(users.get_mut(id).map(|user| {
            user.preferences = preferences.clone();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_picture(&self, id: &ObjectId, picture: &str) -> Result<(), StoreError> {
        if let Some(user) = self.users.write().get_mut(id) {
            user.picture = Some(picture.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().values().filter(|user| user.is_active).count() as u64)
    }
}

/// Insertion-ordered itinerary store used when no MongoDB URI is configured.
#[derive(Default)]
pub struct MemoryItineraryStore {
    itineraries: RwLock<Vec<Itinerary>>,
}

impl MemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_itinerary<T>(&self, id: &ObjectId, f: impl FnOnce(&mut Itinerary) -> T) -> Option<T> {
        self.itineraries
            .write()
            .iter_mut()
            .find(|itinerary| itinerary.id.as_ref() == Some(id))
            .map(f)
    }
}

#[derive(Default)]
struct Group {
    count: i64,
    budget_sum: f64,
}

impl Group {
    fn add(&mut self, budget: f64) {
        self.count += 1;
        self.budget_sum += budget;
    }

    fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.budget_sum / self.count as f64
        }
    }
}

// Grouped rows sorted by count descending; ties keep key order.
fn group_by<'a, K>(
    itineraries: impl Iterator<Item = &'a Itinerary>,
    key: impl Fn(&Itinerary) -> K,
) -> Vec<(K, Group)>
where
    K: Ord,
{
    let mut groups: BTreeMap<K, Group> = BTreeMap::new();
    for itinerary in itineraries {
        groups
            .entry(key(itinerary))
            .or_default()
            .add(itinerary.budget.amount);
    }
    let mut rows: Vec<(K, Group)> = groups.into_iter().collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    rows
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    async fn create(&self, mut itinerary: Itinerary) -> Result<Itinerary, StoreError> {
        itinerary.id = Some(itinerary.id.unwrap_or_else(ObjectId::new));
        self.itineraries.write().push(itinerary.clone());
        Ok(itinerary)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Itinerary>, StoreError> {
        Ok(self
            .itineraries
            .read()
            .iter()
            .find(|itinerary| itinerary.id.as_ref() == Some(id))
            .cloned())
    }

    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Itinerary>, StoreError> {
        let mut owned: Vec<Itinerary> = self
            .itineraries
            .read()
            .iter()
            .filter(|itinerary| &itinerary.user_id == owner)
            .cloned()
            .collect();
        // later inserts win ties
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn increment_views(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.with_itinerary(id, |itinerary| itinerary.views += 1);
        Ok(())
    }

    async fn increment_likes(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self
            .with_itinerary(id, |itinerary| itinerary.likes += 1)
            .is_some())
    }

    async fn update_status(
        &self,
        id: &ObjectId,
        status: ItineraryStatus,
    ) -> Result<bool, StoreError> {
        Ok(self
            .with_itinerary(id, |itinerary| {
                itinerary.status = status;
                itinerary.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn delete(&self, id: &ObjectId, owner: Option<&ObjectId>) -> Result<u64, StoreError> {
        let mut itineraries = self.itineraries.write();
        let position = itineraries.iter().position(|itinerary| {
            itinerary.id.as_ref() == Some(id)
                && owner.map_or(true, |owner| &itinerary.user_id == owner)
        });
        Ok(match position {
            Some(index) => {
                itineraries.remove(index);
                1
            }
            None => 0,
        })
    }

    async fn trends(&self) -> Result<TravelTrends, StoreError> {
        let itineraries = self.itineraries.read();

        let top_destinations = group_by(itineraries.iter(), |it| it.destination.clone())
            .into_iter()
            .take(10)
            .map(|(destination, group)| DestinationTrend {
                destination,
                count: group.count,
                avg_budget: group.avg(),
            })
            .collect();

        let budget_by_travel_style =
            group_by(itineraries.iter(), |it| it.travel_style.as_str().to_string())
                .into_iter()
                .map(|(travel_style, group)| StyleBudget {
                    travel_style,
                    avg_budget: group.avg(),
                    count: group.count,
                })
                .collect();

        Ok(TravelTrends {
            top_destinations,
            budget_by_travel_style,
        })
    }

    async fn totals(&self) -> Result<ItineraryTotals, StoreError> {
        let itineraries = self.itineraries.read();
        if itineraries.is_empty() {
            return Ok(ItineraryTotals::default());
        }
        let budget_sum: f64 = itineraries.iter().map(|it| it.budget.amount).sum();
        Ok(ItineraryTotals {
            total_itineraries: itineraries.len() as i64,
            total_views: itineraries.iter().map(|it| it.views).sum(),
            total_likes: itineraries.iter().map(|it| it.likes).sum(),
            avg_budget: budget_sum / itineraries.len() as f64,
        })
    }

    async fn owner_stats(&self, owner: &ObjectId) -> Result<UserItineraryStats, StoreError> {
        let itineraries = self.itineraries.read();
        let owned: Vec<&Itinerary> = itineraries
            .iter()
            .filter(|it| &it.user_id == owner)
            .collect();
        if owned.is_empty() {
            return Ok(UserItineraryStats::default());
        }
        let total_spent: f64 = owned.iter().map(|it| it.budget.amount).sum();
        Ok(UserItineraryStats {
            total_itineraries: owned.len() as i64,
            total_spent,
            avg_budget: total_spent / owned.len() as f64,
            total_views: owned.iter().map(|it| it.views).sum(),
            total_likes: owned.iter().map(|it| it.likes).sum(),
        })
    }
}
