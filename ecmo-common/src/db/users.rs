//! User database operations

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::centers;
use super::models::{parse_id, NewUser, User, UserDetail, UserPage, UserQuery, UserUpdate};
use super::pagination::Pagination;
use crate::{Error, Result};

const USER_COLUMNS: &str =
    "id, name, email, email_verified, role, description, image, center_id, created_at, updated_at";

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    let center_id: Option<String> = row.try_get("center_id")?;

    Ok(User {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        email_verified: row.try_get("email_verified")?,
        role: role.parse()?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        center_id: center_id.as_deref().map(parse_id).transpose()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Escape LIKE wildcards so the search term matches literally
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Insert a new user
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    new_user.validate()?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name.clone(),
        email: new_user.email.clone(),
        email_verified: new_user.email_verified,
        role: new_user.role,
        description: new_user.description.clone(),
        image: new_user.image.clone(),
        center_id: new_user.center_id,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (
            id, name, email, email_verified, role, description, image, center_id,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.email_verified)
    .bind(user.role.as_str())
    .bind(&user.description)
    .bind(&user.image)
    .bind(user.center_id.map(|id| id.to_string()))
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(Error::from_db)?;

    Ok(user)
}

/// Load user by id
pub async fn get_user(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Load user by exact email
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Load user with assigned center and led centers
pub async fn get_user_detail(pool: &SqlitePool, id: Uuid) -> Result<Option<UserDetail>> {
    match get_user(pool, id).await? {
        Some(user) => Ok(Some(user_detail(pool, user).await?)),
        None => Ok(None),
    }
}

async fn user_detail(pool: &SqlitePool, user: User) -> Result<UserDetail> {
    let center = match user.center_id {
        Some(center_id) => centers::get_center(pool, center_id).await?,
        None => None,
    };
    let director_of = centers::centers_directed_by(pool, user.id).await?;
    let coordinator_of = centers::centers_coordinated_by(pool, user.id).await?;

    Ok(UserDetail {
        user,
        center,
        director_of,
        coordinator_of,
    })
}

/// Users assigned to a center, by name
pub async fn users_in_center(pool: &SqlitePool, center_id: Uuid) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM users WHERE center_id = ? ORDER BY name",
        USER_COLUMNS
    ))
    .bind(center_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(user_from_row).collect()
}

/// Search users by name, email or role (substring, ASCII case folded),
/// newest first
pub async fn search_users(pool: &SqlitePool, query: &UserQuery) -> Result<UserPage> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let where_clause = if search.is_some() {
        r"WHERE name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\' OR role LIKE ? ESCAPE '\'"
    } else {
        ""
    };
    let pattern = search.map(like_pattern);

    let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pattern) = &pattern {
        count_query = count_query.bind(pattern).bind(pattern).bind(pattern);
    }
    let total = count_query.fetch_one(pool).await?;

    let pagination = Pagination::new(total, query.page, query.limit)?;

    let select_sql = format!(
        "SELECT {} FROM users {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        USER_COLUMNS, where_clause
    );
    let mut select_query = sqlx::query(&select_sql);
    if let Some(pattern) = &pattern {
        select_query = select_query.bind(pattern).bind(pattern).bind(pattern);
    }
    let rows = select_query
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(pool)
        .await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in &rows {
        users.push(user_detail(pool, user_from_row(row)?).await?);
    }

    Ok(UserPage {
        users,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages,
    })
}

/// Apply a partial update
pub async fn update_user(pool: &SqlitePool, id: Uuid, update: &UserUpdate) -> Result<User> {
    update.validate()?;

    let mut user = get_user(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;

    if let Some(name) = &update.name {
        user.name = name.clone();
    }
    if let Some(email) = &update.email {
        user.email = email.clone();
    }
    if let Some(role) = update.role {
        user.role = role;
    }
    if let Some(image) = &update.image {
        user.image = Some(image.clone());
    }
    if let Some(description) = &update.description {
        user.description = Some(description.clone());
    }
    if let Some(center_id) = update.center_id {
        user.center_id = Some(center_id);
    }
    user.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, role = ?, image = ?, description = ?, center_id = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .bind(&user.image)
    .bind(&user.description)
    .bind(user.center_id.map(|id| id.to_string()))
    .bind(user.updated_at)
    .bind(user.id.to_string())
    .execute(pool)
    .await
    .map_err(Error::from_db)?;

    Ok(user)
}

/// Point a user at a center
pub async fn assign_center(pool: &SqlitePool, user_id: Uuid, center_id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE users SET center_id = ?, updated_at = ? WHERE id = ?")
        .bind(center_id.to_string())
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(pool)
        .await
        .map_err(Error::from_db)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }
    Ok(())
}

/// Delete a user, returning the removed row
///
/// Fails with `Conflict` while the user directs or coordinates a center.
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<User> {
    let user = get_user(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(Error::from_db)?;

    Ok(user)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?)
}
