use actix_web::{web, HttpResponse};
use log::{info, warn};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};

use crate::db::store::parse_object_id;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::middleware::policy::{authorize, is_elevated, Action};
use crate::models::analytics::AnalyticsEvent;
use crate::models::itinerary::{
    Budget, GenerateRequest, Itinerary, ItineraryResponse, PublicItinerary, SaveItineraryRequest,
    StatusUpdateRequest, DEFAULT_CURRENCY,
};
use crate::models::plan::{TripPlan, TripRequest};
use crate::services::analytics_service::record_detached;
use crate::state::AppState;

fn parse_id(raw: &str, what: &str) -> ApiResult<ObjectId> {
    parse_object_id(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} ID format", what)))
}

fn plan_payload(plan: &TripPlan) -> ApiResult<Value> {
    serde_json::to_value(plan).map_err(|e| ApiError::Internal(e.to_string()))
}

/*
    POST /api/itinerary/generate
*/
pub async fn generate(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    input: web::Json<GenerateRequest>,
) -> ApiResult<HttpResponse> {
    let trip = input.into_inner().validate()?;
    let plan = state.composer.compose(&trip).await;

    let itinerary = Itinerary::new(caller.user_id, &trip, plan_payload(&plan)?);
    let itinerary = state.itineraries.create(itinerary).await?;
    info!(
        "Generated itinerary for {} ({} days) for user {}",
        trip.destination,
        trip.days,
        caller.user_id.to_hex()
    );

    record_creation(&state, &itinerary, &trip, &plan);

    Ok(HttpResponse::Created().json(json!({
        "message": "Itinerary generated successfully",
        "itinerary": ItineraryResponse::from(itinerary),
    })))
}

/*
    POST /api/itinerary/generate-public
    Composed but never stored.
*/
pub async fn generate_public(
    state: web::Data<AppState>,
    input: web::Json<GenerateRequest>,
) -> ApiResult<HttpResponse> {
    let trip = input.into_inner().validate()?;
    let plan = state.composer.compose(&trip).await;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Itinerary generated successfully",
        "itinerary": PublicItinerary {
            destination: trip.destination.clone(),
            budget: Budget {
                amount: trip.budget,
                currency: DEFAULT_CURRENCY.to_string(),
            },
            travel_duration: trip.days,
            travel_style: trip.travel_style,
            itinerary: plan_payload(&plan)?,
            is_public: true,
        },
    })))
}

/*
    POST /api/itinerary/save
*/
pub async fn save(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    input: web::Json<SaveItineraryRequest>,
) -> ApiResult<HttpResponse> {
    let (trip, plan, is_public) = input.into_inner().validate()?;

    let mut itinerary = Itinerary::new(caller.user_id, &trip, plan);
    itinerary.is_public = is_public;
    let itinerary = state.itineraries.create(itinerary).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Itinerary saved successfully",
        "itinerary": ItineraryResponse::from(itinerary),
    })))
}

/*
    GET /api/itinerary/user/{user_id}
*/
pub async fn user_itineraries(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = parse_id(&path, "user")?;
    authorize(&caller, Action::ReadUserItineraries, Some(&owner))?;

    let itineraries: Vec<ItineraryResponse> = state
        .itineraries
        .find_by_owner(&owner)
        .await?
        .into_iter()
        .map(ItineraryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "itineraries": itineraries })))
}

/*
    GET /api/itinerary/{id}
*/
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "itinerary")?;
    let itinerary = state
        .itineraries
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;

    let store = state.itineraries.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = store.increment_views(&id).await {
            warn!("Failed to count view for {}: {}", id.to_hex(), e);
        }
    });

    Ok(HttpResponse::Ok().json(ItineraryResponse::from(itinerary)))
}

/*
    PUT /api/itinerary/{id}/status
*/
pub async fn update_status(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    input: web::Json<StatusUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "itinerary")?;
    let itinerary = state
        .itineraries
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;
    authorize(&caller, Action::ChangeItineraryStatus, Some(&itinerary.user_id))?;

    let status = input.into_inner().status;
    if !state.itineraries.update_status(&id, status).await? {
        return Err(ApiError::not_found("Itinerary not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Itinerary status updated",
        "status": status,
    })))
}

/*
    POST /api/itinerary/{id}/like
*/
pub async fn like(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "itinerary")?;
    if !state.itineraries.increment_likes(&id).await? {
        return Err(ApiError::not_found("Itinerary not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Itinerary liked" })))
}

/*
    DELETE /api/itinerary/{id}
*/
pub async fn delete(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "itinerary")?;
    let itinerary = state
        .itineraries
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;
    authorize(&caller, Action::DeleteItinerary, Some(&itinerary.user_id))?;

    let mut deleted = state.itineraries.delete(&id, Some(&caller.user_id)).await?;
    if deleted == 0 {
        if !is_elevated(caller.role) {
            return Err(ApiError::not_found("Itinerary not found or unauthorized"));
        }
        deleted = state.itineraries.delete(&id, None).await?;
        if deleted == 0 {
            return Err(ApiError::Internal("Failed to delete itinerary".to_string()));
        }
    }
    info!("Deleted itinerary {} for {}", id.to_hex(), caller.email);

    Ok(HttpResponse::Ok().json(json!({ "message": "Itinerary deleted successfully" })))
}

fn record_creation(state: &AppState, itinerary: &Itinerary, trip: &TripRequest, plan: &TripPlan) {
    let Some(itinerary_id) = itinerary.id.map(|id| id.to_hex()) else {
        return;
    };
    let user_id = itinerary.user_id.to_hex();

    record_detached(
        state.analytics.clone(),
        AnalyticsEvent::ItineraryCreated {
            itinerary_id: itinerary_id.clone(),
            user_id: user_id.clone(),
            destination: trip.destination.clone(),
            budget: trip.budget,
            days: trip.days,
            travel_style: trip.travel_style.as_str().to_string(),
            total_cost: parse_cost(&plan.estimated_total_cost).unwrap_or(trip.budget),
        },
    );

    for (index, spot) in plan.tourist_spots.iter().enumerate() {
        record_detached(
            state.analytics.clone(),
            AnalyticsEvent::AttractionListed {
                itinerary_id: itinerary_id.clone(),
                name: spot.name.clone(),
                description: spot.description.clone(),
                day: index as u32 % trip.days.max(1) + 1,
                rating: spot.rating.as_deref().and_then(parse_cost),
                image_url: spot.image_url.clone(),
            },
        );
    }

    record_detached(
        state.analytics.clone(),
        AnalyticsEvent::Usage {
            user_id,
            event_type: "itinerary_created".to_string(),
            destination: Some(trip.destination.clone()),
            metadata: Some(json!({
                "days": trip.days,
                "travel_style": trip.travel_style.as_str(),
            })),
        },
    );
}

/// Reads the first number out of strings like "$1,200 - $1,500" or "4.5/5".
fn parse_cost(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let number: String = cleaned[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.trim_end_matches('.').parse().ok()
}
