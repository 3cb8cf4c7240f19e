//! Estate API endpoints.
//!
//! Create estates, plant trees, read tree statistics and plan drone flights.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use estate_core::{CreateEstateRequest, DronePlan, EstateStats, PlantTreeRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DronePlanQuery {
    #[serde(default, alias = "maxDistance")]
    pub max_distance: Option<i64>,
}

/// Create a new estate.
/// POST /estate
pub async fn create_estate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEstateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let estate = state.create_estate(request).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: estate.id })))
}

/// Plant a tree on an estate plot.
/// POST /estate/:id/tree
pub async fn plant_tree(
    State(state): State<Arc<AppState>>,
    Path(estate_id): Path<Uuid>,
    payload: Result<Json<PlantTreeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let plot = state.place_tree(estate_id, request).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: plot.id })))
}

/// Tree count and height statistics.
/// GET /estate/:id/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(estate_id): Path<Uuid>,
) -> Result<Json<EstateStats>, ApiError> {
    Ok(Json(state.estate_stats(estate_id).await?))
}

/// Coverage distance, plus the rest point when a battery budget is given.
/// GET /estate/:id/drone-plan?max_distance=200
pub async fn get_drone_plan(
    State(state): State<Arc<AppState>>,
    Path(estate_id): Path<Uuid>,
    query: Result<Query<DronePlanQuery>, QueryRejection>,
) -> Result<Json<DronePlan>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if let Some(max_distance) = query.max_distance {
        if max_distance < 1 {
            return Err(ApiError::BadRequest(format!(
                "max_distance must be at least 1, got {}",
                max_distance
            )));
        }
    }
    Ok(Json(state.drone_plan(estate_id, query.max_distance).await?))
}
