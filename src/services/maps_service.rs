use std::collections::HashMap;

use log::{info, warn};
use serde::Deserialize;

use crate::models::maps::{
    DistanceInfo, GeocodeResult, LatLng, NearbyAttractions, Place, PlaceDetails,
};
use crate::services::image_service::placeholder_image;
use crate::services::{http_client, UpstreamError, UpstreamResult};

pub const DEFAULT_RADIUS: u32 = 5000;
const MAX_PLACES: usize = 20;
const NEARBY_LIMIT: usize = 8;
const DEFAULT_OPENING_HOURS: &str = "9:00 AM - 6:00 PM";

// (name, lat, lng, type, rating)
type KnownPlace = (&'static str, f64, f64, &'static str, f64);

const KNOWN_PLACES: [(&str, [KnownPlace; 7]); 8] = [
    ("paris", [
        ("Eiffel Tower", 48.8584, 2.2945, "monument", 4.7),
        ("Louvre Museum", 48.8606, 2.3352, "museum", 4.6),
        ("Notre-Dame", 48.8530, 2.3499, "monument", 4.7),
        ("Arc de Triomphe", 48.8738, 2.2950, "monument", 4.6),
        ("Sacré-Cœur", 48.8867, 2.3431, "monument", 4.6),
        ("Champs-Élysées", 48.8699, 2.3073, "landmark", 4.5),
        ("Versailles Palace", 48.8047, 2.1200, "palace", 4.7),
    ]),
    ("london", [
        ("Big Ben", 51.4975, -0.1246, "monument", 4.6),
        ("Tower of London", 51.5055, -0.0754, "attraction", 4.5),
        ("Buckingham Palace", 51.5007, -0.1415, "palace", 4.5),
        ("British Museum", 51.5194, -0.1270, "museum", 4.6),
        ("Tower Bridge", 51.5055, -0.0754, "monument", 4.6),
        ("Westminster Abbey", 51.4954, -0.1266, "monument", 4.6),
        ("London Eye", 51.5033, -0.1195, "attraction", 4.4),
    ]),
    ("tokyo", [
        ("Senso-ji Temple", 35.7148, 139.7967, "temple", 4.5),
        ("Tokyo Tower", 35.6762, 139.7394, "attraction", 4.5),
        ("Shibuya Crossing", 35.6595, 139.7004, "landmark", 4.6),
        ("Meiji Shrine", 35.6763, 139.7000, "shrine", 4.6),
        ("Tokyo Skytree", 35.7100, 139.8107, "tower", 4.4),
        ("Tsukiji Market", 35.6657, 139.7726, "market", 4.5),
        ("Shinjuku Gyoen", 35.6857, 139.7107, "park", 4.5),
    ]),
    ("new york", [
        ("Statue of Liberty", 40.6892, -74.0445, "monument", 4.5),
        ("Empire State Building", 40.7484, -73.9857, "building", 4.5),
        ("Central Park", 40.7829, -73.9654, "park", 4.5),
        ("Times Square", 40.7580, -73.9855, "landmark", 4.4),
        ("Brooklyn Bridge", 40.7061, -73.9969, "bridge", 4.6),
        ("One World Trade Center", 40.7127, -74.0134, "building", 4.5),
        ("Metropolitan Museum of Art", 40.7813, -73.9740, "museum", 4.6),
    ]),
    ("hyderabad", [
        ("Charminar", 17.3597, 78.4594, "monument", 4.4),
        ("Golconda Fort", 17.3829, 78.4156, "fort", 4.5),
        ("Hussain Sagar Lake", 17.3738, 78.4711, "lake", 4.3),
        ("Mecca Masjid", 17.3609, 78.4682, "mosque", 4.2),
        ("Salar Jung Museum", 17.3650, 78.4844, "museum", 4.4),
        ("Birla Mandir", 17.3809, 78.4711, "temple", 4.4),
        ("Nizam's Museum", 17.3819, 78.4706, "museum", 4.3),
    ]),
    ("delhi", [
        ("Taj Mahal", 27.1751, 78.0421, "monument", 4.7),
        ("Red Fort", 28.6562, 77.2410, "fort", 4.4),
        ("India Gate", 28.6129, 77.2295, "monument", 4.4),
        ("Jama Masjid", 28.6505, 77.2308, "mosque", 4.3),
        ("Qutub Minar", 28.5244, 77.1855, "tower", 4.4),
        ("Rashtrapati Bhavan", 28.5919, 77.1998, "palace", 4.3),
        ("Lal Qila", 28.6562, 77.2410, "fort", 4.4),
    ]),
    ("barcelona", [
        ("Sagrada Familia", 41.4036, 2.1744, "basilica", 4.6),
        ("Park Güell", 41.4145, 2.1528, "park", 4.6),
        ("Gothic Quarter", 41.3851, 2.1734, "district", 4.5),
        ("Las Ramblas", 41.3827, 2.1707, "street", 4.4),
        ("Casa Batlló", 41.3915, 2.1649, "building", 4.6),
        ("Montjuïc", 41.3674, 2.1617, "hill", 4.4),
        ("Arc de Triomf", 41.3906, 2.1859, "monument", 4.4),
    ]),
    ("rome", [
        ("Colosseum", 41.8902, 12.4923, "monument", 4.6),
        ("Roman Forum", 41.8925, 12.4853, "landmark", 4.6),
        ("Pantheon", 41.8986, 12.4769, "monument", 4.6),
        ("Vatican Museums", 41.9063, 12.4534, "museum", 4.5),
        ("Trevi Fountain", 41.9009, 12.4833, "monument", 4.6),
        ("Sistine Chapel", 41.9064, 12.4558, "chapel", 4.7),
        ("Spanish Steps", 41.9058, 12.4741, "landmark", 4.5),
    ]),
];

/// Destination matching shared with the curated attraction table: substring
/// either way, or a shared three-letter prefix.
pub fn matches_destination(query: &str, known: &str) -> bool {
    let query = query.trim().to_lowercase();
    let prefix: String = known.chars().take(3).collect();
    known.contains(query.as_str()) || query.contains(known) || query.starts_with(&prefix)
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    display_name: Option<String>,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn into_place(self, location: &str) -> Option<Place> {
        let point = match (&self.center, self.lat, self.lon) {
            (Some(center), _, _) => LatLng {
                lat: center.lat,
                lng: center.lon,
            },
            (None, Some(lat), Some(lon)) => LatLng { lat, lng: lon },
            _ => return None,
        };
        let name = self.tags.get("name")?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let tag = |key: &str| self.tags.get(key).cloned();

        Some(Place {
            place_id: format!("osm_{}", self.id),
            location: point,
            rating: tag("rating").and_then(|r| r.parse().ok()).unwrap_or(4.3),
            address: tag("addr:full").unwrap_or_else(|| format!("{}, {}", name, location)),
            kind: tag("tourism")
                .or_else(|| tag("leisure"))
                .or_else(|| tag("historic"))
                .unwrap_or_else(|| "attraction".to_string()),
            website: tag("website").unwrap_or_default(),
            opening_hours: tag("opening_hours")
                .unwrap_or_else(|| DEFAULT_OPENING_HOURS.to_string()),
            name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

/// OpenStreetMap-backed geocoding, places and routing.
pub struct MapsService {
    http: reqwest::Client,
    nominatim_url: String,
    overpass_url: String,
    osrm_url: String,
}

impl MapsService {
    pub fn new(nominatim_url: String, overpass_url: String, osrm_url: String) -> Self {
        Self {
            http: http_client(20),
            nominatim_url,
            overpass_url,
            osrm_url,
        }
    }

    pub async fn geocode(&self, address: &str) -> UpstreamResult<GeocodeResult> {
        let response = self
            .http
            .get(format!("{}/search", self.nominatim_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let hits: Vec<NominatimHit> = response.json().await?;
        let hit = hits.into_iter().next().ok_or(UpstreamError::Empty)?;
        let parse = |raw: &str| {
            raw.parse::<f64>()
                .map_err(|e| UpstreamError::Malformed(format!("coordinate {}: {}", raw, e)))
        };

        Ok(GeocodeResult {
            address: hit.display_name.unwrap_or_else(|| address.to_string()),
            lat: parse(&hit.lat)?,
            lng: parse(&hit.lon)?,
        })
    }

    /// Named points of interest within `radius` metres of the geocoded location.
    pub async fn search_places(&self, location: &str, radius: u32) -> UpstreamResult<Vec<Place>> {
        let center = self.geocode(location).await?;
        let query = overpass_query(center.lat, center.lng, radius);

        let response = self
            .http
            .post(&self.overpass_url)
            .form(&[("data", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: OverpassResponse = response.json().await?;
        let places: Vec<Place> = body
            .elements
            .into_iter()
            .filter_map(|element| element.into_place(location))
            .take(MAX_PLACES)
            .collect();

        if places.is_empty() {
            return Err(UpstreamError::Empty);
        }
        info!("Found {} places near {}", places.len(), location);
        Ok(places)
    }

    /// Curated places for known cities, then a live search, then samples.
    pub async fn nearby_places(&self, location: &str, radius: u32) -> NearbyAttractions {
        let (source, attractions) = if let Some(places) = known_places(location) {
            ("curated", places)
        } else {
            match self.search_places(location, radius).await {
                Ok(mut places) => {
                    places.truncate(NEARBY_LIMIT);
                    ("openstreetmap", places)
                }
                Err(e) => {
                    warn!("Nearby search failed for {}: {}", location, e);
                    ("sample", sample_places(location))
                }
            }
        };

        NearbyAttractions {
            location: location.to_string(),
            source: source.to_string(),
            attractions,
        }
    }

    pub fn place_details(&self, place_id: &str) -> PlaceDetails {
        if place_id.starts_with("osm_") {
            PlaceDetails {
                place_id: place_id.to_string(),
                name: "Point of Interest".to_string(),
                formatted_address: "Location details".to_string(),
                rating: 4.5,
                opening_hours: DEFAULT_OPENING_HOURS.to_string(),
            }
        } else {
            PlaceDetails {
                place_id: place_id.to_string(),
                name: "Sample Place".to_string(),
                formatted_address: "123 Sample St".to_string(),
                rating: 4.5,
                opening_hours: DEFAULT_OPENING_HOURS.to_string(),
            }
        }
    }

    pub fn photo_url(&self, photo_reference: &str, maxwidth: u32) -> String {
        let seed = if photo_reference.is_empty() {
            "1"
        } else {
            photo_reference
        };
        let height = u64::from(maxwidth) * 3 / 4;
        placeholder_image(seed, maxwidth, height as u32)
    }

    /// Downloads a photo; returns the bytes and their content type.
    pub async fn fetch_photo(&self, url: &str) -> UpstreamResult<(Vec<u8>, String)> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Driving distance between two addresses. Falls back to a fixed sample.
    pub async fn distance(&self, origin: &str, destination: &str) -> DistanceInfo {
        match self.route(origin, destination).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Routing {} -> {} failed: {}", origin, destination, e);
                sample_distance()
            }
        }
    }

    async fn route(&self, origin: &str, destination: &str) -> UpstreamResult<DistanceInfo> {
        let from = self.geocode(origin).await?;
        let to = self.geocode(destination).await?;
        let url = format!(
            "{}/{},{};{},{}",
            self.osrm_url, from.lng, from.lat, to.lng, to.lat
        );

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }
        let body: OsrmResponse = response.json().await?;
        if body.code != "Ok" {
            return Err(UpstreamError::Malformed(format!("routing code {}", body.code)));
        }
        let route = body.routes.into_iter().next().ok_or(UpstreamError::Empty)?;
        Ok(describe_route(route.distance, route.duration))
    }
}

fn overpass_query(lat: f64, lng: f64, radius: u32) -> String {
    let around = format!("(around:{},{},{})", radius, lat, lng);
    let selectors = [
        r#"node["tourism"~"attraction|museum|monument|viewpoint|zoo"]"#,
        r#"node["leisure"="park"]"#,
        r#"node["historic"~"monument|castle|ruins"]"#,
        r#"way["tourism"~"attraction|museum|monument"]"#,
        r#"way["leisure"="park"]"#,
        r#"way["historic"~"monument|castle|ruins"]"#,
    ];
    let lines: Vec<String> = selectors
        .iter()
        .map(|selector| format!("  {}{};", selector, around))
        .collect();
    format!(
        "[out:json][timeout:20];\n(\n{}\n);\nout center;",
        lines.join("\n")
    )
}

fn describe_route(distance_m: f64, duration_s: f64) -> DistanceInfo {
    let minutes = duration_s / 60.0;
    let duration = if minutes > 60.0 {
        let whole = minutes as u64;
        format!("{}h {}m", whole / 60, whole % 60)
    } else {
        format!("{} mins", minutes as u64)
    };

    DistanceInfo {
        distance: format!("{:.1} km", distance_m / 1000.0),
        distance_value: distance_m as u64,
        duration,
        duration_value: duration_s as u64,
    }
}

fn sample_distance() -> DistanceInfo {
    DistanceInfo {
        distance: "5.2 km".to_string(),
        distance_value: 5200,
        duration: "15 mins".to_string(),
        duration_value: 900,
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn known_places(location: &str) -> Option<Vec<Place>> {
    let (city, places) = KNOWN_PLACES
        .iter()
        .find(|(city, _)| matches_destination(location, city))?;
    let city = title_case(city);

    Some(
        places
            .iter()
            .enumerate()
            .map(|(i, (name, lat, lng, kind, rating))| Place {
                place_id: format!("hardcoded_{}", i),
                name: name.to_string(),
                location: LatLng {
                    lat: *lat,
                    lng: *lng,
                },
                rating: *rating,
                address: format!("{}, {}", name, city),
                kind: kind.to_string(),
                website: String::new(),
                opening_hours: DEFAULT_OPENING_HOURS.to_string(),
            })
            .collect(),
    )
}

fn sample_places(location: &str) -> Vec<Place> {
    let samples = [
        ("Popular Attraction in", 40.7128, -74.0060, 4.5, "123 Main St", "attraction", DEFAULT_OPENING_HOURS),
        ("Museum in", 40.7580, -73.9855, 4.4, "456 Park Ave", "museum", "10:00 AM - 5:00 PM"),
        ("Park in", 40.7829, -73.9654, 4.3, "789 Nature Way", "park", "Sunrise - Sunset"),
    ];

    samples
        .iter()
        .enumerate()
        .map(|(i, (prefix, lat, lng, rating, street, kind, hours))| Place {
            place_id: format!("sample_{}", i),
            name: format!("{} {}", prefix, location),
            location: LatLng {
                lat: *lat,
                lng: *lng,
            },
            rating: *rating,
            address: format!("{}, {}", street, location),
            kind: kind.to_string(),
            website: String::new(),
            opening_hours: hours.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> MapsService {
        let dead = "http://127.0.0.1:9".to_string();
        MapsService::new(dead.clone(), dead.clone(), dead)
    }

    #[test]
    fn destination_matching_accepts_prefixes_and_substrings() {
        assert!(matches_destination("Paris, France", "paris"));
        assert!(matches_destination("  NEW YORK ", "new york"));
        assert!(matches_destination("Barcelona Spain", "barcelona"));
        assert!(matches_destination("Rom", "rome"));
        assert!(!matches_destination("Lisbon", "london"));
    }

    #[test]
    fn photo_heights_keep_a_four_by_three_ratio() {
        let maps = offline();
        assert!(maps.photo_url("abc", 800).ends_with("/800/600"));
        assert!(maps
            .photo_url("abc", u32::MAX)
            .ends_with(&format!("/{}/{}", u32::MAX, 3_221_225_471u32)));
    }

    #[test]
    fn route_durations_switch_to_hours_past_an_hour() {
        let short = describe_route(5234.0, 900.0);
        assert_eq!(short.distance, "5.2 km");
        assert_eq!(short.duration, "15 mins");

        let long = describe_route(120_000.0, 5400.0);
        assert_eq!(long.duration, "1h 30m");
        assert_eq!(long.duration_value, 5400);
    }

    #[test]
    fn overpass_elements_without_names_are_skipped() {
        let body: OverpassResponse = serde_json::from_value(serde_json::json!({
            "elements": [
                { "id": 1, "lat": 1.0, "lon": 2.0, "tags": { "name": "Fort", "historic": "castle" } },
                { "id": 2, "lat": 1.0, "lon": 2.0, "tags": {} },
                { "id": 3, "center": { "lat": 3.0, "lon": 4.0 }, "tags": { "name": "Park" } }
            ]
        }))
        .unwrap();
        let places: Vec<Place> = body
            .elements
            .into_iter()
            .filter_map(|element| element.into_place("Lisbon"))
            .collect();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].kind, "castle");
        assert_eq!(places[0].place_id, "osm_1");
        assert_eq!(places[1].location.lat, 3.0);
        assert_eq!(places[1].address, "Park, Lisbon");
    }

    #[actix_rt::test]
    async fn nearby_uses_curated_then_samples() {
        let maps = offline();

        let paris = maps.nearby_places("Paris", DEFAULT_RADIUS).await;
        assert_eq!(paris.source, "curated");
        assert_eq!(paris.attractions.len(), 7);
        assert_eq!(paris.attractions[0].address, "Eiffel Tower, Paris");

        let unknown = maps.nearby_places("Zzyzx", DEFAULT_RADIUS).await;
        assert_eq!(unknown.source, "sample");
        assert_eq!(unknown.attractions.len(), 3);
        assert_eq!(unknown.attractions[1].name, "Museum in Zzyzx");
    }

    #[actix_rt::test]
    async fn distance_falls_back_to_sample() {
        let info = offline().distance("A", "B").await;
        assert_eq!(info, sample_distance());
    }
}
