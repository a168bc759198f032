//! Full directory reset
//!
//! Clears every directory row before a seeding run. Dependent rows go
//! first: auth rows reference users, centers reference users.

use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// Rows removed per table by a reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetCounts {
    pub sessions: u64,
    pub accounts: u64,
    pub verifications: u64,
    pub centers: u64,
    pub users: u64,
}

/// Delete all sessions, accounts, verifications, centers and users
pub async fn reset_directory(pool: &SqlitePool) -> Result<ResetCounts> {
    let mut tx = pool.begin().await?;

    let sessions = sqlx::query("DELETE FROM sessions").execute(&mut *tx).await?;
    let accounts = sqlx::query("DELETE FROM accounts").execute(&mut *tx).await?;
    let verifications = sqlx::query("DELETE FROM verifications").execute(&mut *tx).await?;
    let centers = sqlx::query("DELETE FROM ecmo_centers").execute(&mut *tx).await?;
    let users = sqlx::query("DELETE FROM users").execute(&mut *tx).await?;

    tx.commit().await?;

    let counts = ResetCounts {
        sessions: sessions.rows_affected(),
        accounts: accounts.rows_affected(),
        verifications: verifications.rows_affected(),
        centers: centers.rows_affected(),
        users: users.rows_affected(),
    };

    info!(
        "Cleared directory: {} users, {} centers, {} sessions, {} accounts, {} verifications",
        counts.users, counts.centers, counts.sessions, counts.accounts, counts.verifications
    );

    Ok(counts)
}
