//! Name normalization, email synthesis and role classification

use ecmo_common::db::UserRole;
use ecmo_common::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder domain for synthesized addresses
pub const EMAIL_DOMAIN: &str = "ecmo.example.com";

/// Trailing credential such as ", MD" or ",RN"
static CREDENTIAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i),\s*(MD|RN|RRT|DO|PhD)$").expect("valid credential pattern"));

/// Middle initial such as " A. " between two name parts
static MIDDLE_INITIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[A-Z]\.\s+").expect("valid initial pattern"));

fn strip_credential(name: &str) -> std::borrow::Cow<'_, str> {
    CREDENTIAL_SUFFIX.replace(name, "")
}

/// Identity key for a person
///
/// Credential suffix and middle initials removed, trimmed, lowercased.
/// `"Jane A. Smith, MD"` and `"jane smith"` share the key `"jane smith"`.
pub fn normalize_name(name: &str) -> String {
    let without_credential = strip_credential(name);
    let without_initials = MIDDLE_INITIAL.replace_all(&without_credential, " ");
    without_initials.trim().to_lowercase()
}

/// Synthesize an email address from a display name
///
/// Uses `first.last` when two or more usable tokens remain, otherwise the
/// single token. A non-zero `counter` is appended to the local part to
/// step around an address that is already taken.
pub fn generate_email(name: &str, counter: u32) -> Result<String> {
    let cleaned: String = strip_credential(name)
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect::<String>()
        .to_lowercase();

    // Single characters are middle initials
    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .collect();

    let local = match tokens.as_slice() {
        [] => {
            return Err(Error::InvalidInput(format!(
                "Cannot derive an email from name {:?}",
                name
            )))
        }
        [only] => only.to_string(),
        [first, .., last] => format!("{}.{}", first, last),
    };

    let suffix = if counter > 0 {
        counter.to_string()
    } else {
        String::new()
    };

    Ok(format!("{}{}@{}", local, suffix, EMAIL_DOMAIN))
}

/// Classify a free-text title
///
/// First match wins: director, coordinator, physician, surgery, else staff.
pub fn extract_role(title: &str) -> UserRole {
    let title = title.to_lowercase();

    if title.contains("director") {
        UserRole::Director
    } else if title.contains("coordinator") {
        UserRole::Coordinator
    } else if title.contains("physician") {
        UserRole::Physician
    } else if title.contains("surgery") {
        UserRole::Surgeon
    } else {
        UserRole::Staff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_credential_and_initial() {
        assert_eq!(normalize_name("Jane A. Smith, MD"), "jane smith");
        assert_eq!(normalize_name("Jane A. Smith, MD"), normalize_name("jane smith"));
    }

    #[test]
    fn test_normalize_credentials_case_insensitive() {
        assert_eq!(normalize_name("Omar Haddad,rn"), "omar haddad");
        assert_eq!(normalize_name("Omar Haddad, PHD"), "omar haddad");
        assert_eq!(normalize_name("Omar Haddad, RRT"), "omar haddad");
        assert_eq!(normalize_name("Omar Haddad, DO"), "omar haddad");
    }

    #[test]
    fn test_normalize_keeps_credential_not_at_end() {
        assert_eq!(normalize_name("Jane Smith, MD, FACS"), "jane smith, md, facs");
    }

    #[test]
    fn test_normalize_only_uppercase_initials() {
        // Lowercase "a." is not treated as an initial
        assert_eq!(normalize_name("Jane a. Smith"), "jane a. smith");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_name("  Ben Cole  "), "ben cole");
    }

    #[test]
    fn test_generate_email_first_last() {
        assert_eq!(generate_email("Jane Smith", 0).unwrap(), "jane.smith@ecmo.example.com");
        assert_eq!(generate_email("Jane Smith", 1).unwrap(), "jane.smith1@ecmo.example.com");
    }

    #[test]
    fn test_generate_email_single_token() {
        assert_eq!(generate_email("Cher", 0).unwrap(), "cher@ecmo.example.com");
        assert_eq!(generate_email("Cher", 3).unwrap(), "cher3@ecmo.example.com");
    }

    #[test]
    fn test_generate_email_drops_initials_and_credentials() {
        assert_eq!(
            generate_email("Jane A. Smith, MD", 0).unwrap(),
            "jane.smith@ecmo.example.com"
        );
        assert_eq!(
            generate_email("Mary Ann van der Berg, RN", 0).unwrap(),
            "mary.berg@ecmo.example.com"
        );
    }

    #[test]
    fn test_generate_email_is_deterministic() {
        assert_eq!(
            generate_email("Omar Haddad", 2).unwrap(),
            generate_email("Omar Haddad", 2).unwrap()
        );
    }

    #[test]
    fn test_generate_email_without_usable_tokens() {
        assert!(generate_email("J.", 0).is_err());
        assert!(generate_email("   ", 0).is_err());
    }

    #[test]
    fn test_extract_role_priority() {
        assert_eq!(
            extract_role("Medical Director, WHS Critical Care"),
            UserRole::Director
        );
        assert_eq!(extract_role("Director of Cardiac Surgery"), UserRole::Director);
        assert_eq!(extract_role("Physician Director"), UserRole::Director);
        assert_eq!(extract_role("ECMO Coordinator"), UserRole::Coordinator);
        assert_eq!(extract_role("Attending Physician"), UserRole::Physician);
        assert_eq!(extract_role("Cardiothoracic Surgery"), UserRole::Surgeon);
        assert_eq!(extract_role("Perfusionist"), UserRole::Staff);
        assert_eq!(extract_role(""), UserRole::Staff);
    }

    #[test]
    fn test_extract_role_case_insensitive() {
        assert_eq!(extract_role("PROGRAM COORDINATOR"), UserRole::Coordinator);
    }
}
