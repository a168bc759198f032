//! Import orchestration
//!
//! A run resets the directory and rebuilds it in four passes:
//! 1. people from team-member rows
//! 2. directors and coordinators not already known
//! 3. centers, whose director and coordinator must resolve
//! 4. team members linked to their center by exact center name
//!
//! A failed row is logged and skipped; only the reset (or reading the
//! input files) can abort a run. Nothing is rolled back.

use ecmo_common::db::{centers, reset_directory, users, CenterType, NewCenter, NewUser, UserRole};
use ecmo_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::csv_reader::{read_centers, read_team_members, CenterRow, TeamMemberRow};
use crate::names::{extract_role, generate_email, normalize_name};

/// Value used in the exports to mean "no value"
pub const PLACEHOLDER: &str = "-";

/// Normalized name → person, scoped to one import run
#[derive(Debug, Default, Clone)]
pub struct IdentityMap {
    ids: HashMap<String, Uuid>,
    names: HashMap<String, String>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Person id for a raw name, matched by normalized key
    pub fn resolve(&self, raw_name: &str) -> Option<Uuid> {
        self.ids.get(&normalize_name(raw_name)).copied()
    }

    pub fn contains(&self, raw_name: &str) -> bool {
        self.ids.contains_key(&normalize_name(raw_name))
    }

    /// First raw name recorded under the same key
    pub fn canonical_name(&self, raw_name: &str) -> Option<&str> {
        self.names.get(&normalize_name(raw_name)).map(String::as_str)
    }

    pub fn insert(&mut self, raw_name: &str, id: Uuid) {
        let key = normalize_name(raw_name);
        self.names.entry(key.clone()).or_insert_with(|| raw_name.to_string());
        self.ids.insert(key, id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Exact center name → created center id
pub type CenterMap = HashMap<String, Uuid>;

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub users_created: usize,
    pub centers_created: usize,
    pub centers_skipped: usize,
    pub members_linked: usize,
    pub rows_failed: usize,
    /// Normalized name → synthesized email
    pub emails: BTreeMap<String, String>,
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == PLACEHOLDER
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// First free synthesized email for a name
///
/// Probes the store with counter 0, 1, 2, ... until no user owns the
/// address. Check-then-act: only sound without concurrent writers.
pub async fn unique_email(pool: &SqlitePool, name: &str) -> Result<String> {
    let mut counter = 0;
    loop {
        let email = generate_email(name, counter)?;
        if users::find_by_email(pool, &email).await?.is_none() {
            return Ok(email);
        }
        debug!("Email {} already taken", email);
        counter += 1;
    }
}

async fn create_person(
    pool: &SqlitePool,
    identities: &mut IdentityMap,
    summary: &mut ImportSummary,
    name: &str,
    role: UserRole,
    description: Option<String>,
    image: Option<String>,
) -> Result<()> {
    let email = unique_email(pool, name).await?;

    let user = users::create_user(
        pool,
        &NewUser {
            name: name.to_string(),
            email: email.clone(),
            email_verified: true,
            role,
            description,
            image,
            center_id: None,
        },
    )
    .await?;

    identities.insert(name, user.id);
    summary.users_created += 1;
    summary.emails.insert(normalize_name(name), email);
    Ok(())
}

/// Pass 1: one person per distinct team-member name
pub async fn seed_team_members(
    pool: &SqlitePool,
    members: &[TeamMemberRow],
    identities: &mut IdentityMap,
    summary: &mut ImportSummary,
) {
    for member in members {
        if is_placeholder(&member.name) || identities.contains(&member.name) {
            continue;
        }

        let role = extract_role(&member.role);
        let description = non_empty(&member.description).or_else(|| non_empty(&member.role));
        let image = non_empty(&member.photo_path);

        match create_person(pool, identities, summary, &member.name, role, description, image).await {
            Ok(()) => info!("  Created user: {} ({})", member.name, role),
            Err(e) => {
                error!("  Failed to create user {}: {}", member.name, e);
                summary.rows_failed += 1;
            }
        }
    }
}

/// Pass 2: directors and coordinators who are not team members
pub async fn seed_center_roles(
    pool: &SqlitePool,
    centers: &[CenterRow],
    identities: &mut IdentityMap,
    summary: &mut ImportSummary,
) {
    for center in centers {
        let roles = [
            (&center.director, UserRole::Director, "Program Director"),
            (&center.coordinator, UserRole::Coordinator, "Program Coordinator"),
        ];

        for (name, role, description) in roles {
            if is_placeholder(name) || identities.contains(name) {
                continue;
            }

            let result = create_person(
                pool,
                identities,
                summary,
                name,
                role,
                Some(description.to_string()),
                None,
            )
            .await;

            match result {
                Ok(()) => info!("  Created {}: {}", role, name),
                Err(e) => {
                    error!("  Failed to create {} {}: {}", role, name, e);
                    summary.rows_failed += 1;
                }
            }
        }
    }
}

/// Pass 3: centers whose director and coordinator both resolve
pub async fn create_centers(
    pool: &SqlitePool,
    rows: &[CenterRow],
    identities: &IdentityMap,
    summary: &mut ImportSummary,
) -> CenterMap {
    let mut created = CenterMap::new();

    for row in rows {
        if row.name.is_empty() {
            continue;
        }

        let Some(director_id) = identities.resolve(&row.director) else {
            warn!("  Skipping {} - missing director ({})", row.name, row.director);
            summary.centers_skipped += 1;
            continue;
        };
        let Some(coordinator_id) = identities.resolve(&row.coordinator) else {
            warn!("  Skipping {} - missing coordinator ({})", row.name, row.coordinator);
            summary.centers_skipped += 1;
            continue;
        };

        let center_type = match row.center_type.parse::<CenterType>() {
            Ok(center_type) => center_type,
            Err(e) => {
                error!("  Failed to create center {}: {}", row.name, e);
                summary.rows_failed += 1;
                continue;
            }
        };

        let new_center = NewCenter {
            name: row.name.clone(),
            center_type,
            city: row.city.clone(),
            state: row.state.clone(),
            zip: row.zip.clone(),
            director_id,
            coordinator_id,
        };

        match centers::create_center(pool, &new_center).await {
            Ok(center) => {
                created.insert(row.name.clone(), center.id);
                summary.centers_created += 1;
                info!("  Created center: {}", row.name);
            }
            Err(e) => {
                error!("  Failed to create center {}: {}", row.name, e);
                summary.rows_failed += 1;
            }
        }
    }

    created
}

/// Pass 4: point each team member at their center
pub async fn link_members(
    pool: &SqlitePool,
    members: &[TeamMemberRow],
    identities: &IdentityMap,
    centers: &CenterMap,
    summary: &mut ImportSummary,
) {
    for member in members {
        let (Some(center_id), Some(user_id)) =
            (centers.get(&member.center), identities.resolve(&member.name))
        else {
            continue;
        };

        match users::assign_center(pool, user_id, *center_id).await {
            Ok(()) => {
                summary.members_linked += 1;
                info!("  Linked {} to {}", member.name, member.center);
            }
            Err(e) => {
                error!("  Failed to link {}: {}", member.name, e);
                summary.rows_failed += 1;
            }
        }
    }
}

/// Reset the directory and rebuild it from parsed rows
pub async fn run_import(
    pool: &SqlitePool,
    center_rows: &[CenterRow],
    member_rows: &[TeamMemberRow],
) -> Result<ImportSummary> {
    info!(
        "Importing {} centers and {} team members",
        center_rows.len(),
        member_rows.len()
    );

    info!("Clearing existing data...");
    reset_directory(pool).await?;

    let mut identities = IdentityMap::new();
    let mut summary = ImportSummary::default();

    info!("Creating team member users...");
    seed_team_members(pool, member_rows, &mut identities, &mut summary).await;

    info!("Creating director and coordinator users...");
    seed_center_roles(pool, center_rows, &mut identities, &mut summary).await;

    info!("Creating ECMO centers...");
    let center_map = create_centers(pool, center_rows, &identities, &mut summary).await;

    info!("Linking users to centers...");
    link_members(pool, member_rows, &identities, &center_map, &mut summary).await;

    info!(
        "Import complete: {} users created, {} centers created, {} centers skipped, {} rows failed",
        summary.users_created, summary.centers_created, summary.centers_skipped, summary.rows_failed
    );

    Ok(summary)
}

/// Read both exports, then run the import
///
/// Files are read before the reset so a missing file leaves the existing
/// directory untouched.
pub async fn import_from_files(
    pool: &SqlitePool,
    centers_path: &Path,
    team_members_path: &Path,
) -> Result<ImportSummary> {
    let center_rows = read_centers(centers_path)?;
    let member_rows = read_team_members(team_members_path)?;

    info!("Found {} centers in {}", center_rows.len(), centers_path.display());
    info!(
        "Found {} team members in {}",
        member_rows.len(),
        team_members_path.display()
    );

    run_import(pool, &center_rows, &member_rows).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecmo_common::db::init_memory_database;

    fn member(center: &str, name: &str, role: &str) -> TeamMemberRow {
        TeamMemberRow {
            center: center.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            ..Default::default()
        }
    }

    fn center(name: &str, director: &str, coordinator: &str) -> CenterRow {
        CenterRow {
            name: name.to_string(),
            center_type: "Adult".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            director: director.to_string(),
            coordinator: coordinator.to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_identity_map_matches_normalized_variants() {
        let mut identities = IdentityMap::new();
        let id = Uuid::new_v4();
        identities.insert("Jane A. Smith, MD", id);

        assert_eq!(identities.resolve("jane smith"), Some(id));
        assert!(identities.contains("JANE SMITH, RN"));
        assert_eq!(identities.canonical_name("Jane Smith"), Some("Jane A. Smith, MD"));
        assert_eq!(identities.len(), 1);
    }

    #[test]
    fn test_identity_map_keeps_first_variant() {
        let mut identities = IdentityMap::new();
        identities.insert("Jane Smith", Uuid::new_v4());
        identities.insert("Jane A. Smith, MD", Uuid::new_v4());
        assert_eq!(identities.canonical_name("jane smith"), Some("Jane Smith"));
    }

    #[tokio::test]
    async fn test_unique_email_steps_past_taken_addresses() {
        let pool = init_memory_database().await.unwrap();
        let mut identities = IdentityMap::new();
        let mut summary = ImportSummary::default();

        // Two different people whose names give the same address
        let members = vec![
            member("", "Jane Smith", "Perfusionist"),
            member("", "Jane Q Smith", "Perfusionist"),
        ];
        seed_team_members(&pool, &members, &mut identities, &mut summary).await;

        assert_eq!(summary.users_created, 2);
        assert_eq!(summary.emails["jane smith"], "jane.smith@ecmo.example.com");
        assert_eq!(summary.emails["jane q smith"], "jane.smith1@ecmo.example.com");
        assert_eq!(unique_email(&pool, "Jane Smith").await.unwrap(), "jane.smith2@ecmo.example.com");
    }

    #[tokio::test]
    async fn test_placeholders_and_duplicates_skipped() {
        let pool = init_memory_database().await.unwrap();
        let mut identities = IdentityMap::new();
        let mut summary = ImportSummary::default();

        let members = vec![
            member("Mercy", "-", "Nurse"),
            member("Mercy", "", "Nurse"),
            member("Mercy", "Jane A. Smith, MD", "Attending Physician"),
            member("Lakeside", "jane smith", "Surgery"),
        ];
        seed_team_members(&pool, &members, &mut identities, &mut summary).await;

        assert_eq!(summary.users_created, 1);
        let jane = users::get_user(&pool, identities.resolve("Jane Smith").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jane.name, "Jane A. Smith, MD");
        assert_eq!(jane.role, UserRole::Physician);
        assert_eq!(jane.description.as_deref(), Some("Attending Physician"));
    }

    #[tokio::test]
    async fn test_center_roles_only_add_unknown_people() {
        let pool = init_memory_database().await.unwrap();
        let mut identities = IdentityMap::new();
        let mut summary = ImportSummary::default();

        seed_team_members(
            &pool,
            &[member("Mercy", "Ada Byrne, MD", "Medical Director")],
            &mut identities,
            &mut summary,
        )
        .await;
        seed_center_roles(
            &pool,
            &[center("Mercy", "Ada Byrne", "Ben Cole, RN"), center("Lakeside", "-", "")],
            &mut identities,
            &mut summary,
        )
        .await;

        assert_eq!(summary.users_created, 2);
        let ben = users::get_user(&pool, identities.resolve("Ben Cole").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ben.role, UserRole::Coordinator);
        assert_eq!(ben.description.as_deref(), Some("Program Coordinator"));
        assert_eq!(ben.email, "ben.cole@ecmo.example.com");
    }

    #[tokio::test]
    async fn test_center_with_unknown_director_not_in_map() {
        let pool = init_memory_database().await.unwrap();
        let mut identities = IdentityMap::new();
        let mut summary = ImportSummary::default();

        seed_team_members(
            &pool,
            &[member("Mercy", "Ben Cole", "ECMO Coordinator")],
            &mut identities,
            &mut summary,
        )
        .await;

        let created = create_centers(
            &pool,
            &[center("Mercy", "Nobody Known", "Ben Cole")],
            &identities,
            &mut summary,
        )
        .await;

        assert!(created.is_empty());
        assert_eq!(summary.centers_skipped, 1);
        assert_eq!(centers::count_centers(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_center_type_counts_as_failure() {
        let pool = init_memory_database().await.unwrap();
        let mut identities = IdentityMap::new();
        let mut summary = ImportSummary::default();

        let mut row = center("Mercy", "Ada Byrne", "Ben Cole");
        row.center_type = "Geriatric".to_string();
        seed_center_roles(&pool, std::slice::from_ref(&row), &mut identities, &mut summary).await;

        let created = create_centers(&pool, &[row], &identities, &mut summary).await;
        assert!(created.is_empty());
        assert_eq!(summary.rows_failed, 1);
    }
}
