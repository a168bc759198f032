//! Database models

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of patient population a center treats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CenterType {
    Adult,
    Pediatric,
    Neonatal,
}

impl CenterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CenterType::Adult => "ADULT",
            CenterType::Pediatric => "PEDIATRIC",
            CenterType::Neonatal => "NEONATAL",
        }
    }
}

impl fmt::Display for CenterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses case-insensitively; "adult", "Adult" and "ADULT" are equivalent
impl FromStr for CenterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADULT" => Ok(CenterType::Adult),
            "PEDIATRIC" => Ok(CenterType::Pediatric),
            "NEONATAL" => Ok(CenterType::Neonatal),
            other => Err(Error::InvalidInput(format!("Unknown center type: {:?}", other))),
        }
    }
}

/// Staff classification of a directory user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Director,
    Coordinator,
    Physician,
    Surgeon,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Director => "director",
            UserRole::Coordinator => "coordinator",
            UserRole::Physician => "physician",
            UserRole::Surgeon => "surgeon",
            UserRole::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "director" => Ok(UserRole::Director),
            "coordinator" => Ok(UserRole::Coordinator),
            "physician" => Ok(UserRole::Physician),
            "surgeon" => Ok(UserRole::Surgeon),
            "staff" => Ok(UserRole::Staff),
            other => Err(Error::InvalidInput(format!("Unknown role: {:?}", other))),
        }
    }
}

/// Directory user (staff member, director or coordinator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub role: UserRole,
    pub description: Option<String>,
    pub image: Option<String>,
    pub center_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ECMO treatment center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcmoCenter {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub center_type: CenterType,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub director_id: Uuid,
    pub coordinator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub role: UserRole,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub center_id: Option<Uuid>,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        validate_required("name", &self.name)?;
        validate_email(&self.email)
    }
}

/// Partial user update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub center_id: Option<Uuid>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_required("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

/// Fields for creating a center
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCenter {
    pub name: String,
    #[serde(rename = "type")]
    pub center_type: CenterType,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub director_id: Uuid,
    pub coordinator_id: Uuid,
}

impl NewCenter {
    pub fn validate(&self) -> Result<()> {
        validate_required("name", &self.name)
    }
}

/// Partial center update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub center_type: Option<CenterType>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub director_id: Option<Uuid>,
    pub coordinator_id: Option<Uuid>,
}

impl CenterUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_required("name", name)?;
        }
        Ok(())
    }
}

/// User with its center and the centers it leads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub center: Option<EcmoCenter>,
    pub director_of: Vec<EcmoCenter>,
    pub coordinator_of: Vec<EcmoCenter>,
}

/// Center with its director, coordinator and assigned staff
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterDetail {
    #[serde(flatten)]
    pub center: EcmoCenter,
    pub director: Option<User>,
    pub coordinator: Option<User>,
    pub users: Vec<User>,
}

/// User search parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of user search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<UserDetail>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Minimal address check: one '@', non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::InvalidInput(format!("Invalid email: {:?}", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain
        .split('.')
        .collect::<Vec<_>>();
    if dotted.len() < 2 || dotted.iter().any(|part| part.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Parse a stored UUID column
pub(crate) fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Corrupt id {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_type_parse_is_case_insensitive() {
        assert_eq!("adult".parse::<CenterType>().unwrap(), CenterType::Adult);
        assert_eq!("Pediatric".parse::<CenterType>().unwrap(), CenterType::Pediatric);
        assert_eq!("NEONATAL".parse::<CenterType>().unwrap(), CenterType::Neonatal);
        assert!("Geriatric".parse::<CenterType>().is_err());
    }

    #[test]
    fn test_center_type_serializes_uppercase() {
        let json = serde_json::to_string(&CenterType::Pediatric).unwrap();
        assert_eq!(json, "\"PEDIATRIC\"");
    }

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [
            UserRole::Director,
            UserRole::Coordinator,
            UserRole::Physician,
            UserRole::Surgeon,
            UserRole::Staff,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("nurse".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane.smith@ecmo.example.com").is_ok());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("@ecmo.example.com").is_err());
        assert!(validate_email("jane smith@ecmo.example.com").is_err());
        assert!(validate_email("jane@@ecmo.example.com").is_err());
        assert!(validate_email("jane@ecmo..com").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_new_user_requires_name() {
        let user = NewUser {
            name: "  ".to_string(),
            email: "a.b@ecmo.example.com".to_string(),
            email_verified: false,
            role: UserRole::Staff,
            description: None,
            image: None,
            center_id: None,
        };
        assert!(matches!(user.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_center_json_uses_type_key() {
        let json = r#"{
            "name": "Mercy",
            "type": "ADULT",
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "directorId": "00000000-0000-0000-0000-000000000001",
            "coordinatorId": "00000000-0000-0000-0000-000000000002"
        }"#;
        let center: NewCenter = serde_json::from_str(json).unwrap();
        assert_eq!(center.center_type, CenterType::Adult);
        assert_eq!(center.city, "Springfield");
    }
}
