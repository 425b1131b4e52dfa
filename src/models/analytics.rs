use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events shipped to the analytical store. Dropped events are not retried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    UserRegistered {
        user_id: String,
        email: String,
    },
    ItineraryCreated {
        itinerary_id: String,
        user_id: String,
        destination: String,
        budget: f64,
        days: u32,
        travel_style: String,
        total_cost: f64,
    },
    AttractionListed {
        itinerary_id: String,
        name: String,
        description: String,
        day: u32,
        rating: Option<f64>,
        image_url: String,
    },
    Usage {
        user_id: String,
        event_type: String,
        destination: Option<String>,
        metadata: Option<Value>,
    },
}

impl AnalyticsEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsEvent::UserRegistered { .. } => "user_registered",
            AnalyticsEvent::ItineraryCreated { .. } => "itinerary_created",
            AnalyticsEvent::AttractionListed { .. } => "attraction_listed",
            AnalyticsEvent::Usage { .. } => "usage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationTrend {
    pub destination: String,
    pub count: i64,
    pub avg_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleBudget {
    pub travel_style: String,
    pub avg_budget: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTrends {
    pub top_destinations: Vec<DestinationTrend>,
    pub budget_by_travel_style: Vec<StyleBudget>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItineraryTotals {
    pub total_itineraries: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub avg_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_itineraries: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub avg_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserItineraryStats {
    pub total_itineraries: i64,
    pub total_spent: f64,
    pub avg_budget: f64,
    pub total_views: i64,
    pub total_likes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularDestination {
    pub destination: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelStyleStat {
    pub travel_style: String,
    pub count: i64,
    pub avg_budget: f64,
    pub avg_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInsights {
    pub total_itineraries: i64,
    pub unique_destinations: i64,
    pub avg_budget: f64,
    pub total_spent: f64,
    pub last_itinerary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAttraction {
    pub name: String,
    pub appearances: i64,
    pub avg_rating: f64,
}
