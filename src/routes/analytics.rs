use actix_web::{web, HttpResponse};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::store::{parse_object_id, StoreError};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::middleware::policy::{authorize, Action};
use crate::models::analytics::PlatformStats;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Sink reads degrade to empty data rather than an error.
fn warehouse<T: Serialize + Default>(
    query: &str,
    result: Result<T, StoreError>,
) -> HttpResponse {
    let data = result.unwrap_or_else(|e| {
        warn!("Analytics query {} failed: {}", query, e);
        T::default()
    });
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

/*
    GET /api/analytics/trends
*/
pub async fn trends(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.itineraries.trends().await?))
}

/*
    GET /api/analytics/stats (elevated roles only)
*/
pub async fn platform_stats(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    authorize(&caller, Action::ReadPlatformStats, None)?;

    let total_users = state.users.count_active().await?;
    let totals = state.itineraries.totals().await?;

    Ok(HttpResponse::Ok().json(PlatformStats {
        total_users,
        total_itineraries: totals.total_itineraries,
        total_views: totals.total_views,
        total_likes: totals.total_likes,
        avg_budget: totals.avg_budget,
    }))
}

/*
    GET /api/analytics/user/{user_id}/stats
*/
pub async fn user_stats(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = parse_object_id(&path)
        .map_err(|_| ApiError::bad_request("Invalid user ID format"))?;
    authorize(&caller, Action::ReadUserStats, Some(&owner))?;

    Ok(HttpResponse::Ok().json(state.itineraries.owner_stats(&owner).await?))
}

/*
    GET /api/analytics/popular-destinations?limit=
*/
pub async fn popular_destinations(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    warehouse(
        "popular-destinations",
        state.analytics.popular_destinations(query.limit()).await,
    )
}

/*
    GET /api/analytics/travel-style-stats
*/
pub async fn travel_style_stats(state: web::Data<AppState>) -> HttpResponse {
    warehouse(
        "travel-style-stats",
        state.analytics.travel_style_stats().await,
    )
}

/*
    GET /api/analytics/user-insights
*/
pub async fn user_insights(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> HttpResponse {
    warehouse(
        "user-insights",
        state.analytics.user_insights(&caller.user_id.to_hex()).await,
    )
}

/*
    GET /api/analytics/top-attractions?limit=
*/
pub async fn top_attractions(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    warehouse(
        "top-attractions",
        state.analytics.top_attractions(query.limit()).await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(LimitQuery { limit: None }.limit(), 10);
        assert_eq!(LimitQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(LimitQuery { limit: Some(5000) }.limit(), 100);
    }
}
