use actix_web::{http::header::CONTENT_TYPE, web, HttpResponse};
use log::warn;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::models::maps::{DistanceQuery, GeocodeQuery, NearbyQuery, PhotoQuery, PlaceDetailsQuery};
use crate::services::maps_service::DEFAULT_RADIUS;
use crate::state::AppState;

const DEFAULT_PHOTO_WIDTH: u32 = 800;
const MAX_PHOTO_WIDTH: u32 = 1600;

fn required(value: Option<&str>, message: &str) -> ApiResult<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(message))
}

/*
    GET /api/maps/nearby-attractions?location=&radius=
*/
pub async fn nearby_attractions(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> ApiResult<HttpResponse> {
    let location = required(query.location.as_deref(), "Location required")?;
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS);

    let nearby = state.maps.nearby_places(&location, radius).await;
    Ok(HttpResponse::Ok().json(nearby))
}

/*
    GET /api/maps/place-details?place_id=
*/
pub async fn place_details(
    state: web::Data<AppState>,
    query: web::Query<PlaceDetailsQuery>,
) -> ApiResult<HttpResponse> {
    let place_id = required(query.place_id.as_deref(), "place_id required")?;
    Ok(HttpResponse::Ok().json(state.maps.place_details(&place_id)))
}

/*
    GET /api/maps/photo?photo_reference=&maxwidth=
    Streams the photo bytes, or hands back the URL when the fetch fails.
*/
pub async fn photo(
    state: web::Data<AppState>,
    query: web::Query<PhotoQuery>,
) -> ApiResult<HttpResponse> {
    let reference = required(query.photo_reference.as_deref(), "photo_reference required")?;
    let maxwidth = query
        .maxwidth
        .unwrap_or(DEFAULT_PHOTO_WIDTH)
        .clamp(1, MAX_PHOTO_WIDTH);
    let cache_key = format!("photo::{}::w{}", reference, maxwidth);

    if let Some((bytes, content_type)) = state.photos.get(&cache_key) {
        return Ok(HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, content_type))
            .body(bytes));
    }

    let photo_url = state.maps.photo_url(&reference, maxwidth);
    match state.maps.fetch_photo(&photo_url).await {
        Ok((bytes, content_type)) => {
            state
                .photos
                .insert(cache_key, (bytes.clone(), content_type.clone()));
            Ok(HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, content_type))
                .body(bytes))
        }
        Err(e) => {
            warn!("Photo fetch failed for {}: {}", photo_url, e);
            Ok(HttpResponse::Ok().json(json!({ "photo_url": photo_url })))
        }
    }
}

/*
    GET /api/maps/geocode?address=
*/
pub async fn geocode(
    state: web::Data<AppState>,
    query: web::Query<GeocodeQuery>,
) -> ApiResult<HttpResponse> {
    let address = required(query.address.as_deref(), "Address required")?;

    match state.maps.geocode(&address).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            warn!("Geocoding {} failed: {}", address, e);
            Err(ApiError::not_found("Location not found"))
        }
    }
}

/*
    GET /api/maps/distance?origin=&destination=
*/
pub async fn distance(
    state: web::Data<AppState>,
    query: web::Query<DistanceQuery>,
) -> ApiResult<HttpResponse> {
    let (Some(origin), Some(destination)) = (
        query.origin.as_deref().map(str::trim).filter(|o| !o.is_empty()),
        query
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Origin and destination required"));
    };

    Ok(HttpResponse::Ok().json(state.maps.distance(origin, destination).await))
}
