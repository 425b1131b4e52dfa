use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::attraction::Attraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Leisure,
    Adventure,
    Cultural,
    Budget,
}

impl TravelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelStyle::Leisure => "leisure",
            TravelStyle::Adventure => "adventure",
            TravelStyle::Cultural => "cultural",
            TravelStyle::Budget => "budget",
        }
    }

    pub fn parse(style: &str) -> Option<Self> {
        match style {
            "leisure" => Some(TravelStyle::Leisure),
            "adventure" => Some(TravelStyle::Adventure),
            "cultural" => Some(TravelStyle::Cultural),
            "budget" => Some(TravelStyle::Budget),
            _ => None,
        }
    }
}

/// Validated trip parameters handed to the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub destination: String,
    pub budget: f64,
    pub days: u32,
    pub travel_style: TravelStyle,
}

/// Day-by-day plan payload, either generated or built from the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub tourist_spots: Vec<Attraction>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimated_total_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub day: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default)]
    pub activities: Vec<PlannedActivity>,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedActivity {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cost: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default, deserialize_with = "lenient_string")]
    pub breakfast: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lunch: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dinner: String,
}

/// Generated text puts numbers where strings are expected; accept either.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_costs_are_accepted_as_text() {
        let day: DayPlan = serde_json::from_value(json!({
            "day": 2,
            "title": "Museums",
            "activities": [{ "time": "10:00 AM", "activity": "Louvre", "cost": 17, "duration": 3 }],
            "total_cost": 120.5
        }))
        .unwrap();

        assert_eq!(day.activities[0].cost, "17");
        assert_eq!(day.activities[0].duration, "3");
        assert_eq!(day.total_cost, "120.5");
        assert_eq!(day.meals, Meals::default());
    }

    #[test]
    fn travel_styles_are_a_closed_set() {
        assert_eq!(TravelStyle::parse("cultural"), Some(TravelStyle::Cultural));
        assert_eq!(TravelStyle::parse("luxury"), None);
    }
}
