use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKET_PRICE: &str = "$15-25";
pub const DEFAULT_OPENING_HOURS: &str = "9:00 AM - 6:00 PM";

/// A named point of interest surfaced to the itinerary composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_ticket_price")]
    pub ticket_price: String,
    #[serde(default = "default_opening_hours")]
    pub opening_hours: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default)]
    pub image_url: String,
}

fn default_ticket_price() -> String {
    DEFAULT_TICKET_PRICE.to_string()
}

fn default_opening_hours() -> String {
    DEFAULT_OPENING_HOURS.to_string()
}

impl Attraction {
    pub fn new(name: impl Into<String>, description: impl Into<String>, image_url: String) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ticket_price: default_ticket_price(),
            opening_hours: default_opening_hours(),
            rating: None,
            image_url,
        }
    }
}
