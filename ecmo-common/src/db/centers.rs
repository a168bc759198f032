//! ECMO center database operations

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::models::{parse_id, CenterDetail, CenterUpdate, EcmoCenter, NewCenter};
use super::users::{self, like_pattern};
use crate::{Error, Result};

const CENTER_COLUMNS: &str =
    "id, name, type, city, state, zip, director_id, coordinator_id, created_at, updated_at";

fn center_from_row(row: &SqliteRow) -> Result<EcmoCenter> {
    let id: String = row.try_get("id")?;
    let center_type: String = row.try_get("type")?;
    let director_id: String = row.try_get("director_id")?;
    let coordinator_id: String = row.try_get("coordinator_id")?;

    Ok(EcmoCenter {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        center_type: center_type.parse()?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip: row.try_get("zip")?,
        director_id: parse_id(&director_id)?,
        coordinator_id: parse_id(&coordinator_id)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new center
///
/// Director and coordinator must already exist; otherwise the foreign key
/// check rejects the row with `Conflict`.
pub async fn create_center(pool: &SqlitePool, new_center: &NewCenter) -> Result<EcmoCenter> {
    new_center.validate()?;

    let now = Utc::now();
    let center = EcmoCenter {
        id: Uuid::new_v4(),
        name: new_center.name.clone(),
        center_type: new_center.center_type,
        city: new_center.city.clone(),
        state: new_center.state.clone(),
        zip: new_center.zip.clone(),
        director_id: new_center.director_id,
        coordinator_id: new_center.coordinator_id,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO ecmo_centers (
            id, name, type, city, state, zip, director_id, coordinator_id,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(center.id.to_string())
    .bind(&center.name)
    .bind(center.center_type.as_str())
    .bind(&center.city)
    .bind(&center.state)
    .bind(&center.zip)
    .bind(center.director_id.to_string())
    .bind(center.coordinator_id.to_string())
    .bind(center.created_at)
    .bind(center.updated_at)
    .execute(pool)
    .await
    .map_err(Error::from_db)?;

    Ok(center)
}

/// Load center by id
pub async fn get_center(pool: &SqlitePool, id: Uuid) -> Result<Option<EcmoCenter>> {
    let row = sqlx::query(&format!("SELECT {} FROM ecmo_centers WHERE id = ?", CENTER_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(center_from_row).transpose()
}

/// Load center with director, coordinator and assigned staff
pub async fn get_center_detail(pool: &SqlitePool, id: Uuid) -> Result<Option<CenterDetail>> {
    match get_center(pool, id).await? {
        Some(center) => Ok(Some(center_detail(pool, center).await?)),
        None => Ok(None),
    }
}

async fn center_detail(pool: &SqlitePool, center: EcmoCenter) -> Result<CenterDetail> {
    let director = users::get_user(pool, center.director_id).await?;
    let coordinator = users::get_user(pool, center.coordinator_id).await?;
    let users = users::users_in_center(pool, center.id).await?;

    Ok(CenterDetail {
        center,
        director,
        coordinator,
        users,
    })
}

/// Search centers by name, city or state (substring, ASCII case folded)
pub async fn search_centers(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<CenterDetail>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let rows = match search {
        Some(term) => {
            let pattern = like_pattern(term);
            sqlx::query(&format!(
                r"SELECT {} FROM ecmo_centers
                  WHERE name LIKE ? ESCAPE '\' OR city LIKE ? ESCAPE '\' OR state LIKE ? ESCAPE '\'
                  ORDER BY name",
                CENTER_COLUMNS
            ))
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!("SELECT {} FROM ecmo_centers ORDER BY name", CENTER_COLUMNS))
                .fetch_all(pool)
                .await?
        }
    };

    let mut centers = Vec::with_capacity(rows.len());
    for row in &rows {
        centers.push(center_detail(pool, center_from_row(row)?).await?);
    }
    Ok(centers)
}

/// Centers a user directs
pub async fn centers_directed_by(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<EcmoCenter>> {
    centers_where(pool, "director_id", user_id).await
}

/// Centers a user coordinates
pub async fn centers_coordinated_by(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<EcmoCenter>> {
    centers_where(pool, "coordinator_id", user_id).await
}

// `column` is always one of the fixed names above, never caller input
async fn centers_where(pool: &SqlitePool, column: &str, user_id: Uuid) -> Result<Vec<EcmoCenter>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM ecmo_centers WHERE {} = ? ORDER BY name",
        CENTER_COLUMNS, column
    ))
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(center_from_row).collect()
}

/// Apply a partial update
pub async fn update_center(pool: &SqlitePool, id: Uuid, update: &CenterUpdate) -> Result<EcmoCenter> {
    update.validate()?;

    let mut center = get_center(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("center {}", id)))?;

    if let Some(name) = &update.name {
        center.name = name.clone();
    }
    if let Some(center_type) = update.center_type {
        center.center_type = center_type;
    }
    if let Some(city) = &update.city {
        center.city = city.clone();
    }
    if let Some(state) = &update.state {
        center.state = state.clone();
    }
    if let Some(zip) = &update.zip {
        center.zip = zip.clone();
    }
    if let Some(director_id) = update.director_id {
        center.director_id = director_id;
    }
    if let Some(coordinator_id) = update.coordinator_id {
        center.coordinator_id = coordinator_id;
    }
    center.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE ecmo_centers
        SET name = ?, type = ?, city = ?, state = ?, zip = ?, director_id = ?,
            coordinator_id = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&center.name)
    .bind(center.center_type.as_str())
    .bind(&center.city)
    .bind(&center.state)
    .bind(&center.zip)
    .bind(center.director_id.to_string())
    .bind(center.coordinator_id.to_string())
    .bind(center.updated_at)
    .bind(center.id.to_string())
    .execute(pool)
    .await
    .map_err(Error::from_db)?;

    Ok(center)
}

/// Delete a center, returning the removed row
///
/// Users assigned to the center keep their records; their `center_id`
/// becomes NULL.
pub async fn delete_center(pool: &SqlitePool, id: Uuid) -> Result<EcmoCenter> {
    let center = get_center(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("center {}", id)))?;

    sqlx::query("DELETE FROM ecmo_centers WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(Error::from_db)?;

    Ok(center)
}

pub async fn count_centers(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM ecmo_centers")
        .fetch_one(pool)
        .await?)
}
