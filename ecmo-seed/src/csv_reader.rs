//! Minimal CSV reader for the seed exports
//!
//! Quote handling is deliberately simple: a `"` toggles quoted mode and is
//! itself dropped, commas inside quotes are literal, and there is no escaped
//! quote. An unclosed quote runs to end of line.

use ecmo_common::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// One data row keyed by header name; values are trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvRecord {
    fields: HashMap<String, String>,
}

impl CsvRecord {
    /// Value of a column, or "" when the column is absent
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split one line into raw (untrimmed) fields
pub fn parse_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}

/// Parse CSV text: first non-blank line is the header
pub fn parse_records(content: &str) -> Vec<CsvRecord> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let headers: Vec<String> = match lines.next() {
        Some(header) => parse_line(header)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    lines
        .map(|line| {
            let mut values = parse_line(line).into_iter();
            let fields = headers
                .iter()
                .map(|header| {
                    let value = values.next().unwrap_or_default();
                    (header.clone(), value.trim().to_string())
                })
                .collect();
            CsvRecord { fields }
        })
        .collect()
}

/// Read and parse a CSV file
pub fn read_records(path: &Path) -> Result<Vec<CsvRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(&content))
}

/// Row of the centers export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CenterRow {
    pub name: String,
    pub center_type: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub director: String,
    pub coordinator: String,
    pub phone: String,
}

impl CenterRow {
    pub fn from_record(record: &CsvRecord) -> Self {
        Self {
            name: record.get("ECMOCenter").to_string(),
            center_type: record.get("Type").to_string(),
            city: record.get("City").to_string(),
            state: record.get("State").to_string(),
            zip: record.get("Zip").to_string(),
            director: record.get("Program Director").to_string(),
            coordinator: record.get("Program Coordinator").to_string(),
            phone: record.get("Phone").to_string(),
        }
    }
}

/// Row of the team-members export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamMemberRow {
    pub center: String,
    pub name: String,
    pub role: String,
    pub photo_path: String,
    pub description: String,
}

impl TeamMemberRow {
    pub fn from_record(record: &CsvRecord) -> Self {
        Self {
            center: record.get("Center").to_string(),
            name: record.get("Name").to_string(),
            role: record.get("Role").to_string(),
            photo_path: record.get("PhotoPath").to_string(),
            description: record.get("Description").to_string(),
        }
    }
}

/// Read the centers export
pub fn read_centers(path: &Path) -> Result<Vec<CenterRow>> {
    Ok(read_records(path)?.iter().map(CenterRow::from_record).collect())
}

/// Read the team-members export
pub fn read_team_members(path: &Path) -> Result<Vec<TeamMemberRow>> {
    Ok(read_records(path)?.iter().map(TeamMemberRow::from_record).collect())
}
