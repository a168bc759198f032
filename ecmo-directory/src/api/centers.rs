//! ECMO center endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use ecmo_common::db::{centers, CenterDetail, CenterUpdate, EcmoCenter, NewCenter};
use serde::Deserialize;
use tracing::info;

use super::parse_path_id;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for center listing
#[derive(Debug, Default, Deserialize)]
pub struct CenterQuery {
    /// Substring of name, city or state
    pub search: Option<String>,
}

/// GET /api/centers
///
/// Returns every matching center ordered by name, with its director,
/// coordinator and assigned staff.
pub async fn list_centers(
    State(state): State<AppState>,
    query: Result<Query<CenterQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CenterDetail>>> {
    let Query(query) = query?;
    let list = centers::search_centers(&state.db, query.search.as_deref()).await?;
    Ok(Json(list))
}

/// GET /api/centers/:id
pub async fn get_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CenterDetail>> {
    let id = parse_path_id(&id)?;
    let detail = centers::get_center_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("center {}", id)))?;
    Ok(Json(detail))
}

/// POST /api/centers
pub async fn create_center(
    State(state): State<AppState>,
    payload: Result<Json<NewCenter>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EcmoCenter>)> {
    let Json(new_center) = payload?;
    let center = centers::create_center(&state.db, &new_center).await?;
    info!("Created center {} ({})", center.name, center.center_type);
    Ok((StatusCode::CREATED, Json(center)))
}

/// PATCH /api/centers/:id
pub async fn update_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CenterUpdate>, JsonRejection>,
) -> ApiResult<Json<EcmoCenter>> {
    let id = parse_path_id(&id)?;
    let Json(update) = payload?;
    let center = centers::update_center(&state.db, id, &update).await?;
    Ok(Json(center))
}

/// DELETE /api/centers/:id
pub async fn delete_center(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EcmoCenter>> {
    let id = parse_path_id(&id)?;
    let center = centers::delete_center(&state.db, id).await?;
    info!("Deleted center {}", center.name);
    Ok(Json(center))
}
