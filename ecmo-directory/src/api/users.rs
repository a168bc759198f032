//! User directory endpoints
//!
//! Listing is paginated (`page`, `limit`) and filtered by a free-text
//! `search` over name, email and role.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use ecmo_common::db::{users, NewUser, User, UserDetail, UserPage, UserQuery, UserUpdate};
use tracing::info;

use super::parse_path_id;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<UserPage>> {
    let Query(query) = query?;
    let page = users::search_users(&state.db, &query).await?;
    Ok(Json(page))
}

/// GET /api/users/:id
///
/// Includes the user's center and the centers they direct or coordinate.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserDetail>> {
    let id = parse_path_id(&id)?;
    let detail = users::get_user_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;
    Ok(Json(detail))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new_user) = payload?;
    let user = users::create_user(&state.db, &new_user).await?;
    info!("Created user {} <{}>", user.name, user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_path_id(&id)?;
    let Json(update) = payload?;
    let user = users::update_user(&state.db, id, &update).await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
///
/// Refused with 409 while the user still directs or coordinates a center.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_path_id(&id)?;
    let user = users::delete_user(&state.db, id).await?;
    info!("Deleted user {} <{}>", user.name, user.email);
    Ok(Json(user))
}
