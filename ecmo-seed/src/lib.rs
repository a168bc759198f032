//! ecmo-seed library - Directory Importer
//!
//! Rebuilds the ECMO directory from two CSV exports: one row per center
//! (with director and coordinator names) and one row per team member.
//! People are deduplicated by normalized name, given synthesized unique
//! emails and role tags, then linked to their centers.

pub mod csv_reader;
pub mod importer;
pub mod names;

pub use csv_reader::{read_records, CenterRow, CsvRecord, TeamMemberRow};
pub use importer::{run_import, CenterMap, IdentityMap, ImportSummary};
pub use names::{extract_role, generate_email, normalize_name, EMAIL_DOMAIN};

/// File name of the centers export inside the seed data folder
pub const CENTERS_FILE: &str = "ecmo-centers.csv";

/// File name of the team-members export inside the seed data folder
pub const TEAM_MEMBERS_FILE: &str = "ecmo-team-members.csv";
