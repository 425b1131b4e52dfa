use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::models::attraction::Attraction;
use crate::models::itinerary::DEFAULT_CURRENCY;
use crate::models::plan::{lenient_string, DayPlan, Meals, PlannedActivity, TripPlan, TripRequest};
use crate::services::attraction_service::{AttractionSource, MAX_ATTRACTIONS};
use crate::services::llm_service::CompletionProvider;

const FALLBACK_SPOTS: usize = 6;

const SYSTEM_PROMPT: &str = "You are a travel planning expert. You MUST ONLY use the real tourist \
attractions provided in the user's message. Never invent or hallucinate attraction names. \
Always use the exact names provided.";

// (time, activity, budget divisor, duration)
const TEMPLATE_SLOTS: [(&str, &str, i64, &str); 5] = [
    ("08:00 AM", "Breakfast at local cafe", 4, "1 hour"),
    ("10:00 AM", "Visit major attraction in {destination}", 3, "3 hours"),
    ("01:00 PM", "Lunch at restaurant", 4, "1.5 hours"),
    ("03:00 PM", "Local exploration & shopping", 5, "2 hours"),
    ("07:00 PM", "Dinner & evening entertainment", 3, "2 hours"),
];

/// Plan as returned by the model. Spots stay untyped until reconciled.
#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default)]
    days: Vec<DayPlan>,
    #[serde(default)]
    tourist_spots: Option<Vec<Value>>,
    #[serde(default)]
    tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    estimated_total_cost: String,
}

/// Builds day-by-day plans around a trusted attraction list.
pub struct ItineraryComposer {
    attractions: AttractionSource,
    llm: Option<Arc<dyn CompletionProvider>>,
}

impl ItineraryComposer {
    pub fn new(attractions: AttractionSource, llm: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { attractions, llm }
    }

    pub async fn compose(&self, trip: &TripRequest) -> TripPlan {
        let trusted = self.attractions.lookup(&trip.destination).await;
        info!(
            "Composing {}-day plan for {} around {} attractions",
            trip.days,
            trip.destination,
            trusted.len()
        );

        let Some(llm) = &self.llm else {
            return template_plan(trip, trusted);
        };

        match generate(llm.as_ref(), trip, &trusted).await {
            Some(plan) => plan,
            None => template_plan(trip, trusted),
        }
    }
}

async fn generate(
    llm: &dyn CompletionProvider,
    trip: &TripRequest,
    trusted: &[Attraction],
) -> Option<TripPlan> {
    let prompt = build_prompt(trip, trusted);
    let reply = match llm.complete(SYSTEM_PROMPT, &prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Itinerary generation with {} failed: {}", llm.model(), e);
            return None;
        }
    };

    let Some(json) = extract_json(&reply) else {
        warn!("Generated itinerary contained no JSON object");
        return None;
    };
    let generated: GeneratedPlan = match serde_json::from_str(json) {
        Ok(plan) => plan,
        Err(e) => {
            warn!("Generated itinerary was malformed: {}", e);
            return None;
        }
    };

    let tourist_spots = match generated.tourist_spots {
        Some(spots) if !spots.is_empty() => reconcile_spots(&spots, trusted),
        _ => trusted.iter().take(FALLBACK_SPOTS).cloned().collect(),
    };

    Some(TripPlan {
        title: generated.title,
        destination: Some(trip.destination.clone()),
        budget: Some(trip.budget),
        currency: Some(DEFAULT_CURRENCY.to_string()),
        days: generated.days,
        tourist_spots,
        tips: generated.tips,
        estimated_total_cost: generated.estimated_total_cost,
    })
}

fn build_prompt(trip: &TripRequest, trusted: &[Attraction]) -> String {
    let listed: Vec<String> = trusted
        .iter()
        .take(MAX_ATTRACTIONS)
        .map(|a| format!("- {}: {}", a.name, a.description))
        .collect();

    format!(
        r#"Generate a {days}-day travel itinerary for {destination} with a budget of ${budget} USD.
Travel style: {style}.

IMPORTANT: You MUST ONLY use the following REAL tourist attractions from {destination}:
{listed}

Create an itinerary that includes visits to these REAL attractions. Do NOT invent or hallucinate attraction names.
Use ONLY the attraction names listed above.

Respond with a single JSON object of this shape:
{{
  "title": "itinerary title",
  "days": [
    {{
      "day": 1,
      "title": "day title",
      "activities": [
        {{"time": "09:00 AM", "activity": "activity description", "cost": "estimated cost", "duration": "duration in hours"}}
      ],
      "meals": {{"breakfast": "recommendation", "lunch": "recommendation", "dinner": "recommendation"}},
      "total_cost": "estimated daily cost"
    }}
  ],
  "tourist_spots": [
    {{"name": "EXACT name from the provided list", "description": "brief description", "ticket_price": "price in USD", "opening_hours": "opening hours", "image_url": "placeholder"}}
  ],
  "tips": ["travel tip"],
  "estimated_total_cost": "total trip cost estimate"
}}

tourist_spots MUST contain 5-7 attractions from the list above. Keep the plan within budget."#,
        days = trip.days,
        destination = trip.destination,
        budget = trip.budget,
        style = trip.travel_style.as_str(),
        listed = listed.join("\n"),
    )
}

/// Slice from the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn text_field(spot: &Value, key: &str) -> Option<String> {
    match spot.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Rewrites generated spots so every name comes from `trusted`.
///
/// Exact (case-insensitive) matches keep the generated price and hours when
/// present and take everything else from the trusted record. Unmatched spots
/// are replaced by `trusted[accepted % len]`. The result is topped up with
/// unused trusted records and capped at eight.
pub fn reconcile_spots(generated: &[Value], trusted: &[Attraction]) -> Vec<Attraction> {
    if trusted.is_empty() {
        return Vec::new();
    }

    let mut accepted: Vec<Attraction> = Vec::new();
    for spot in generated.iter().filter(|spot| spot.is_object()) {
        let name = text_field(spot, "name").unwrap_or_default();
        let reconciled = match trusted.iter().find(|t| same_name(&t.name, &name)) {
            Some(matched) => Attraction {
                name: matched.name.clone(),
                description: matched.description.clone(),
                ticket_price: text_field(spot, "ticket_price")
                    .unwrap_or_else(|| matched.ticket_price.clone()),
                opening_hours: text_field(spot, "opening_hours")
                    .unwrap_or_else(|| matched.opening_hours.clone()),
                rating: text_field(spot, "rating").or_else(|| matched.rating.clone()),
                image_url: matched.image_url.clone(),
            },
            None => trusted[accepted.len() % trusted.len()].clone(),
        };
        accepted.push(reconciled);
    }

    for candidate in trusted {
        if accepted.len() >= trusted.len() {
            break;
        }
        if !accepted.iter().any(|a| same_name(&a.name, &candidate.name)) {
            accepted.push(candidate.clone());
        }
    }

    accepted.truncate(MAX_ATTRACTIONS);
    accepted
}

/// Deterministic plan: five fixed slots per day priced from the daily budget.
pub fn template_plan(trip: &TripRequest, tourist_spots: Vec<Attraction>) -> TripPlan {
    let budget = trip.budget.trunc() as i64;
    let days = i64::from(trip.days.max(1));
    let per_day = budget / days;
    let destination = &trip.destination;

    let day_plans = (1..=trip.days)
        .map(|day| DayPlan {
            day,
            title: format!("Day {}: Exploring {}", day, destination),
            activities: TEMPLATE_SLOTS
                .iter()
                .map(|(time, activity, divisor, duration)| PlannedActivity {
                    time: time.to_string(),
                    activity: activity.replace("{destination}", destination),
                    cost: format!("${}", per_day / divisor),
                    duration: duration.to_string(),
                })
                .collect(),
            meals: Meals {
                breakfast: "Local cafe specialties".to_string(),
                lunch: "Traditional restaurant".to_string(),
                dinner: "Fine dining experience".to_string(),
            },
            total_cost: format!("${}", per_day),
        })
        .collect();

    TripPlan {
        title: format!("{} Days in {}", trip.days, destination),
        destination: Some(destination.clone()),
        budget: Some(trip.budget),
        currency: Some(DEFAULT_CURRENCY.to_string()),
        days: day_plans,
        tourist_spots,
        tips: vec![
            format!("Best time to visit {} is during shoulder seasons", destination),
            "Use public transportation to save on costs".to_string(),
            "Book attractions in advance for discounts".to_string(),
            "Try local cuisine for authentic experience".to_string(),
            "Visit free attractions and parks".to_string(),
        ],
        estimated_total_cost: format!("${}", budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::TravelStyle;
    use crate::services::image_service::ImageService;
    use crate::services::maps_service::MapsService;
    use crate::services::UpstreamResult;
    use async_trait::async_trait;
    use serde_json::json;

    const PARIS: [&str; 7] = [
        "Eiffel Tower",
        "Louvre Museum",
        "Notre-Dame",
        "Arc de Triomphe",
        "Sacré-Cœur",
        "Champs-Élysées",
        "Versailles",
    ];

    struct CannedReply(String);

    #[async_trait]
    impl CompletionProvider for CannedReply {
        async fn complete(&self, _system: &str, _prompt: &str) -> UpstreamResult<String> {
            Ok(self.0.clone())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    fn composer(llm: Option<Arc<dyn CompletionProvider>>) -> ItineraryComposer {
        let dead = "http://127.0.0.1:9".to_string();
        let maps = Arc::new(MapsService::new(dead.clone(), dead.clone(), dead));
        let images = Arc::new(ImageService::placeholder_only());
        ItineraryComposer::new(AttractionSource::standard(maps, images), llm)
    }

    fn trip(destination: &str, budget: f64, days: u32) -> TripRequest {
        TripRequest {
            destination: destination.to_string(),
            budget,
            days,
            travel_style: TravelStyle::Leisure,
        }
    }

    fn trusted(names: &[&str]) -> Vec<Attraction> {
        names
            .iter()
            .map(|name| Attraction::new(*name, format!("About {}", name), format!("img/{}", name)))
            .collect()
    }

    #[actix_rt::test]
    async fn paris_template_has_three_days_of_five_activities() {
        let plan = composer(None).compose(&trip("Paris", 1000.0, 3)).await;

        assert_eq!(plan.days.len(), 3);
        assert!(plan.days.iter().all(|day| day.activities.len() == 5));
        assert!(!plan.tourist_spots.is_empty());
        for spot in &plan.tourist_spots {
            assert!(PARIS.contains(&spot.name.as_str()), "{}", spot.name);
        }
        assert_eq!(plan.title, "3 Days in Paris");
        assert_eq!(plan.days[0].activities[0].cost, "$83");
        assert_eq!(plan.days[0].activities[3].cost, "$66");
    }

    #[test]
    fn template_day_totals_add_up_to_the_budget() {
        let plan = template_plan(&trip("Rome", 900.0, 3), Vec::new());
        let total: i64 = plan
            .days
            .iter()
            .map(|day| day.total_cost.trim_start_matches('$').parse::<i64>().unwrap())
            .sum();
        assert_eq!(total, 900);
        assert_eq!(plan.estimated_total_cost, "$900");
    }

    #[test]
    fn invented_names_never_survive_reconciliation() {
        let trusted = trusted(&["Colosseum", "Pantheon", "Trevi Fountain"]);
        let generated = vec![
            json!({ "name": "Hidden Rooftop Bar" }),
            json!({ "name": "pantheon", "ticket_price": "Free" }),
            json!("not an object"),
            json!({ "name": "Moon Base" }),
            json!({ "description": "nameless" }),
        ];

        let spots = reconcile_spots(&generated, &trusted);
        assert!(spots
            .iter()
            .all(|spot| trusted.iter().any(|t| same_name(&t.name, &spot.name))));
        let names: Vec<&str> = spots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Colosseum", "Pantheon", "Trevi Fountain", "Colosseum"]);
        assert_eq!(spots[1].ticket_price, "Free");
        assert_eq!(spots[1].image_url, "img/Pantheon");
    }

    #[test]
    fn short_generated_lists_are_topped_up_and_capped() {
        let names = ["A1", "B2", "C3", "D4", "E5", "F6", "G7", "H8"];
        let trusted = trusted(&names);

        let topped = reconcile_spots(&[json!({ "name": "C3" })], &trusted);
        let topped: Vec<&str> = topped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(topped, vec!["C3", "A1", "B2", "D4", "E5", "F6", "G7", "H8"]);

        let flood: Vec<Value> = (0..12).map(|i| json!({ "name": format!("Fake {}", i) })).collect();
        assert_eq!(reconcile_spots(&flood, &trusted).len(), MAX_ATTRACTIONS);
    }

    #[actix_rt::test]
    async fn generated_plans_are_reconciled_against_curated_names() {
        let reply = json!({
            "title": "Paris in Style",
            "days": [{ "day": 1, "title": "Arrival", "activities": [], "total_cost": 250 }],
            "tourist_spots": [{ "name": "Eiffel Tower" }, { "name": "Secret Catacomb Disco" }],
            "tips": ["Walk a lot"]
        });
        let llm: Arc<dyn CompletionProvider> =
            Arc::new(CannedReply(format!("Sure! Here you go:\n{}\nEnjoy.", reply)));

        let plan = composer(Some(llm)).compose(&trip("Paris", 1000.0, 1)).await;
        assert_eq!(plan.title, "Paris in Style");
        assert_eq!(plan.days[0].total_cost, "250");
        assert_eq!(plan.tourist_spots[0].name, "Eiffel Tower");
        assert_eq!(plan.tourist_spots[1].name, "Louvre Museum");
        assert!(plan
            .tourist_spots
            .iter()
            .all(|spot| PARIS.contains(&spot.name.as_str())));
    }

    #[actix_rt::test]
    async fn unparseable_replies_fall_back_to_the_template() {
        let llm: Arc<dyn CompletionProvider> =
            Arc::new(CannedReply("I cannot help with that.".to_string()));
        let plan = composer(Some(llm)).compose(&trip("Tokyo", 700.0, 2)).await;
        assert_eq!(plan.title, "2 Days in Tokyo");
        assert_eq!(plan.days.len(), 2);
    }
}
