use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{info, warn};

use crate::models::attraction::Attraction;
use crate::services::image_service::ImageService;
use crate::services::maps_service::{matches_destination, MapsService};

pub const MAX_ATTRACTIONS: usize = 8;
const MIN_PLACES: usize = 5;
const PLACES_RADIUS: u32 = 15_000;
const PLACEHOLDER_COUNT: usize = 5;

const CURATED: [(&str, [&str; 7]); 10] = [
    ("paris", ["Eiffel Tower", "Louvre Museum", "Notre-Dame", "Arc de Triomphe", "Sacré-Cœur", "Champs-Élysées", "Versailles"]),
    ("london", ["Big Ben", "Tower of London", "Buckingham Palace", "British Museum", "Tower Bridge", "Westminster Abbey", "London Eye"]),
    ("tokyo", ["Senso-ji Temple", "Tokyo Tower", "Shibuya Crossing", "Meiji Shrine", "Tsukiji Market", "Tokyo Skytree", "Shinjuku Gyoen"]),
    ("new york", ["Statue of Liberty", "Empire State Building", "Central Park", "Times Square", "Brooklyn Bridge", "One World Trade Center", "Museum of Natural History"]),
    ("hyderabad", ["Charminar", "Golconda Fort", "Hussain Sagar Lake", "Mecca Masjid", "Salar Jung Museum", "Birla Mandir", "Nizam's Museum"]),
    ("delhi", ["Taj Mahal", "Red Fort", "India Gate", "Jama Masjid", "Qutub Minar", "Rashtrapati Bhavan", "Lal Qila"]),
    ("barcelona", ["Sagrada Familia", "Park Güell", "Gothic Quarter", "Las Ramblas", "Casa Batlló", "Montjuïc", "Arc de Triomf"]),
    ("rome", ["Colosseum", "Roman Forum", "Pantheon", "Vatican Museums", "Trevi Fountain", "Sistine Chapel", "Spanish Steps"]),
    ("dubai", ["Burj Khalifa", "Dubai Mall", "Palm Jumeirah", "Gold Souk", "Sheikh Mohammed Centre", "Dubai Marina", "Jumeirah Beach"]),
    ("mumbai", ["Gateway of India", "Marine Drive", "Taj Mahal Palace", "Elephanta Caves", "Haji Ali", "CST Station", "Siddhivinayak Temple"]),
];

/// One tier of attraction lookup. `None` hands the destination to the next tier.
#[async_trait]
pub trait AttractionProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn try_resolve(&self, destination: &str) -> Option<Vec<Attraction>>;
}

pub fn curated_names(destination: &str) -> Option<&'static [&'static str]> {
    CURATED
        .iter()
        .find(|(known, _)| matches_destination(destination, known))
        .map(|(_, names)| &names[..])
}

async fn with_images(
    images: &ImageService,
    destination: &str,
    entries: Vec<(String, String, Option<String>)>,
) -> Vec<Attraction> {
    let lookups = entries
        .iter()
        .map(|(name, _, _)| images.resolve(name, Some(destination)));
    let urls = join_all(lookups).await;

    entries
        .into_iter()
        .zip(urls)
        .map(|((name, description, rating), image_url)| {
            let mut attraction = Attraction::new(name, description, image_url);
            attraction.rating = rating;
            attraction
        })
        .collect()
}

pub struct CuratedAttractions {
    images: Arc<ImageService>,
}

impl CuratedAttractions {
    pub fn new(images: Arc<ImageService>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl AttractionProvider for CuratedAttractions {
    fn name(&self) -> &'static str {
        "curated"
    }

    async fn try_resolve(&self, destination: &str) -> Option<Vec<Attraction>> {
        let names = curated_names(destination)?;
        let entries = names
            .iter()
            .take(MAX_ATTRACTIONS)
            .map(|name| {
                (
                    name.to_string(),
                    format!("Famous tourist attraction in {}", destination),
                    None,
                )
            })
            .collect();
        Some(with_images(&self.images, destination, entries).await)
    }
}

pub struct PlacesAttractions {
    maps: Arc<MapsService>,
    images: Arc<ImageService>,
}

impl PlacesAttractions {
    pub fn new(maps: Arc<MapsService>, images: Arc<ImageService>) -> Self {
        Self { maps, images }
    }
}

#[async_trait]
impl AttractionProvider for PlacesAttractions {
    fn name(&self) -> &'static str {
        "places"
    }

    async fn try_resolve(&self, destination: &str) -> Option<Vec<Attraction>> {
        let places = match self.maps.search_places(destination, PLACES_RADIUS).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Places lookup failed for {}: {}", destination, e);
                return None;
            }
        };

        let mut seen: Vec<String> = Vec::new();
        let mut entries = Vec::new();
        for place in places {
            let name = place.name.trim().to_string();
            let key = name.to_lowercase();
            if name.chars().count() < 3 || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            entries.push((name, place.address, Some(place.rating.to_string())));
            if entries.len() >= MAX_ATTRACTIONS {
                break;
            }
        }

        if entries.len() < MIN_PLACES {
            info!(
                "Only {} usable places for {}, skipping tier",
                entries.len(),
                destination
            );
            return None;
        }
        Some(with_images(&self.images, destination, entries).await)
    }
}

pub struct PlaceholderAttractions {
    images: Arc<ImageService>,
}

impl PlaceholderAttractions {
    pub fn new(images: Arc<ImageService>) -> Self {
        Self { images }
    }

    async fn build(&self, destination: &str) -> Vec<Attraction> {
        let entries = (1..=PLACEHOLDER_COUNT)
            .map(|n| {
                (
                    format!("Popular Attraction {}", n),
                    format!("Tourist spot in {}", destination),
                    None,
                )
            })
            .collect();
        with_images(&self.images, destination, entries).await
    }
}

#[async_trait]
impl AttractionProvider for PlaceholderAttractions {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn try_resolve(&self, destination: &str) -> Option<Vec<Attraction>> {
        Some(self.build(destination).await)
    }
}

/// Ordered chain of attraction tiers; the first tier with an answer wins.
pub struct AttractionSource {
    providers: Vec<Box<dyn AttractionProvider>>,
    fallback: PlaceholderAttractions,
}

impl AttractionSource {
    pub fn new(providers: Vec<Box<dyn AttractionProvider>>, images: Arc<ImageService>) -> Self {
        Self {
            providers,
            fallback: PlaceholderAttractions::new(images),
        }
    }

    /// Curated table, then live places, then placeholders.
    pub fn standard(maps: Arc<MapsService>, images: Arc<ImageService>) -> Self {
        Self::new(
            vec![
                Box::new(CuratedAttractions::new(images.clone())),
                Box::new(PlacesAttractions::new(maps, images.clone())),
                Box::new(PlaceholderAttractions::new(images.clone())),
            ],
            images,
        )
    }

    /// Never empty, at most eight records.
    pub async fn lookup(&self, destination: &str) -> Vec<Attraction> {
        for provider in &self.providers {
            if let Some(mut attractions) = provider.try_resolve(destination).await {
                if attractions.is_empty() {
                    continue;
                }
                info!(
                    "Using {} {} attractions for {}",
                    attractions.len(),
                    provider.name(),
                    destination
                );
                attractions.truncate(MAX_ATTRACTIONS);
                return attractions;
            }
        }
        self.fallback.build(destination).await
    }
}
