//! HTTP API handlers for ecmo-directory

pub mod centers;
pub mod health;
pub mod users;

pub use centers::{create_center, delete_center, get_center, list_centers, update_center};
pub use health::health_routes;
pub use users::{create_user, delete_user, get_user, list_users, update_user};

use crate::error::{ApiError, ApiResult};
use uuid::Uuid;

/// Parse a `:id` path segment
fn parse_path_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", raw)))
}
