use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::plan::{TravelStyle, TripRequest};

pub const MIN_DAYS: i64 = 1;
pub const MAX_DAYS: i64 = 30;
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItineraryStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub destination: String,
    pub budget: Budget,
    // days
    pub travel_duration: u32,
    pub travel_style: TravelStyle,
    // opaque plan payload: days, tourist_spots, tips
    pub itinerary: Value,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub status: ItineraryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Itinerary {
    pub fn new(user_id: ObjectId, trip: &TripRequest, plan: Value) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            destination: trip.destination.clone(),
            budget: Budget {
                amount: trip.budget,
                currency: DEFAULT_CURRENCY.to_string(),
            },
            travel_duration: trip.days,
            travel_style: trip.travel_style,
            itinerary: plan,
            is_public: false,
            views: 0,
            likes: 0,
            status: ItineraryStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// JSON view of an itinerary with hex string identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub destination: String,
    pub budget: Budget,
    pub travel_duration: u32,
    pub travel_style: TravelStyle,
    pub itinerary: Value,
    pub is_public: bool,
    pub views: i64,
    pub likes: i64,
    pub status: ItineraryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Itinerary> for ItineraryResponse {
    fn from(itinerary: Itinerary) -> Self {
        Self {
            id: itinerary.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: itinerary.user_id.to_hex(),
            destination: itinerary.destination,
            budget: itinerary.budget,
            travel_duration: itinerary.travel_duration,
            travel_style: itinerary.travel_style,
            itinerary: itinerary.itinerary,
            is_public: itinerary.is_public,
            views: itinerary.views,
            likes: itinerary.likes,
            status: itinerary.status,
            created_at: itinerary.created_at,
            updated_at: itinerary.updated_at,
        }
    }
}

/// Body of the generate endpoints. Budget and days arrive as numbers or
/// numeric strings depending on the client.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub destination: Option<String>,
    pub budget: Option<Value>,
    pub days: Option<Value>,
    pub travel_style: Option<String>,
}

impl GenerateRequest {
    pub fn validate(self) -> ApiResult<TripRequest> {
        let destination = non_blank(self.destination);
        let (Some(destination), Some(budget)) = (destination, self.budget) else {
            return Err(ApiError::bad_request("Destination and budget required"));
        };
        parse_trip(destination, &budget, self.days.as_ref(), 3, self.travel_style)
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveItineraryRequest {
    pub destination: Option<String>,
    pub budget: Option<Value>,
    pub days: Option<Value>,
    pub travel_style: Option<String>,
    pub itinerary: Option<Value>,
    pub is_public: Option<bool>,
}

impl SaveItineraryRequest {
    pub fn validate(self) -> ApiResult<(TripRequest, Value, bool)> {
        let destination = non_blank(self.destination);
        let plan = self.itinerary.filter(|plan| !plan.is_null());
        let (Some(destination), Some(budget), Some(plan)) = (destination, self.budget, plan) else {
            return Err(ApiError::bad_request(
                "destination, budget and itinerary are required",
            ));
        };
        let trip = parse_trip(destination, &budget, self.days.as_ref(), 1, self.travel_style)?;
        Ok((trip, plan, self.is_public.unwrap_or(false)))
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ItineraryStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicItinerary {
    pub destination: String,
    pub budget: Budget,
    pub travel_duration: u32,
    pub travel_style: TravelStyle,
    pub itinerary: Value,
    pub is_public: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn parse_trip(
    destination: String,
    budget: &Value,
    days: Option<&Value>,
    default_days: i64,
    travel_style: Option<String>,
) -> ApiResult<TripRequest> {
    let invalid = || ApiError::bad_request("Invalid input format");

    let budget = parse_number(budget).ok_or_else(invalid)?;
    let days = match days {
        Some(value) if !value.is_null() => parse_whole(value).ok_or_else(invalid)?,
        _ => default_days,
    };

    if budget <= 0.0 {
        return Err(ApiError::bad_request("Budget must be greater than 0"));
    }
    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(ApiError::bad_request("Days must be between 1 and 30"));
    }
    let travel_style = match travel_style {
        Some(style) => TravelStyle::parse(style.trim())
            .ok_or_else(|| ApiError::bad_request("Invalid travel style"))?,
        None => TravelStyle::Leisure,
    };

    Ok(TripRequest {
        destination,
        budget,
        days: days as u32,
        travel_style,
    })
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|number: &f64| number.is_finite())
}

fn parse_whole(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
