use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LandmarkQuery {
    pub name: Option<String>,
    pub destination: Option<String>,
}

/*
    GET /api/images/landmark?name=&destination=
    Always answers with a URL; a placeholder when no photo is found.
*/
pub async fn landmark(
    state: web::Data<AppState>,
    query: web::Query<LandmarkQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let name = query
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Landmark name required"))?;
    let destination = query
        .destination
        .map(|destination| destination.trim().to_string())
        .unwrap_or_default();

    let destination_hint = Some(destination.as_str()).filter(|d| !d.is_empty());
    let image_url = state.images.resolve(&name, destination_hint).await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "landmark": name,
        "destination": destination,
        "image_url": image_url,
    })))
}
