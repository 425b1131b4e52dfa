use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// A point of interest as reported by the places lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub location: LatLng,
    pub rating: f64,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub website: String,
    pub opening_hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceInfo {
    pub distance: String,
    pub distance_value: u64,
    pub duration: String,
    pub duration_value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub rating: f64,
    pub opening_hours: String,
}

#[derive(Debug, Serialize)]
pub struct NearbyAttractions {
    pub location: String,
    pub source: String,
    pub attractions: Vec<Place>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub location: Option<String>,
    pub radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsQuery {
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub photo_reference: Option<String>,
    pub maxwidth: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
}
