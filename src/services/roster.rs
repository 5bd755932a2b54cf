// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! CSV import/export of the member roster.
//!
//! Import is keyed on email: new addresses create members, known addresses
//! update them. Imported rows default to guest status, and a missing display
//! name falls back to the email local-part.

use crate::models::member::Member;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One raw CSV row as read from the file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    is_guest: Option<String>,
    #[serde(default)]
    join_date: Option<String>,
}

/// One exported roster row.
#[derive(Debug, Serialize)]
struct CsvExportRow<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    display_name: &'a str,
    phone_number: &'a str,
    is_guest: bool,
    join_date: String,
}

/// A normalized roster record ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub phone_number: String,
    pub is_guest: bool,
    pub join_date: Option<NaiveDate>,
}

fn parse_bool_cell(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn normalize_row(row: CsvRow) -> Result<RosterRecord, String> {
    let email = row.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(format!("invalid email '{}'", row.email));
    }

    // Display name falls back to the email local-part.
    let display_name = match row.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.split('@').next().unwrap_or(&email).to_string(),
    };

    // Imported rows are guests unless the file says otherwise.
    let is_guest = match row.is_guest.as_deref().map(str::trim) {
        Some(cell) if !cell.is_empty() => {
            parse_bool_cell(cell).ok_or_else(|| format!("invalid is_guest '{}'", cell))?
        }
        _ => true,
    };

    let join_date = match row.join_date.as_deref().map(str::trim) {
        Some(cell) if !cell.is_empty() => Some(
            NaiveDate::parse_from_str(cell, "%Y-%m-%d")
                .map_err(|_| format!("invalid join_date '{}'", cell))?,
        ),
        _ => None,
    };

    Ok(RosterRecord {
        email,
        first_name: row.first_name.unwrap_or_default().trim().to_string(),
        last_name: row.last_name.unwrap_or_default().trim().to_string(),
        display_name,
        phone_number: row.phone_number.unwrap_or_default().trim().to_string(),
        is_guest,
        join_date,
    })
}

/// Parse a roster CSV. Bad rows are reported and skipped; good rows are
/// returned for upserting.
pub fn parse_roster_csv(data: &str) -> Result<(Vec<RosterRecord>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1, first data row is line 2.
        let line = index + 2;
        match row {
            Ok(row) => match normalize_row(row) {
                Ok(record) => records.push(record),
                Err(message) => errors.push(format!("line {}: {}", line, message)),
            },
            Err(e) => errors.push(format!("line {}: {}", line, e)),
        }
    }

    Ok((records, errors))
}

/// Serialize the roster to CSV.
pub fn write_roster_csv(members: &[Member]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for member in members {
        writer
            .serialize(CsvExportRow {
                email: &member.email,
                first_name: &member.first_name,
                last_name: &member.last_name,
                display_name: &member.display_name,
                phone_number: &member.phone_number,
                is_guest: member.is_guest,
                join_date: member
                    .join_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            })
            .context("Failed to serialize roster row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush roster CSV: {e}"))?;
    String::from_utf8(bytes).context("Roster CSV is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_import_defaults_guest_and_display_name() {
        let csv = "email,first_name,last_name\njane@example.com,Jane,Doe\n";
        let (records, errors) = parse_roster_csv(csv).unwrap();

        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "jane@example.com");
        assert_eq!(records[0].display_name, "jane");
        assert!(records[0].is_guest);
    }

    #[test]
    fn test_import_explicit_fields() {
        let csv = "email,display_name,is_guest,join_date\n\
                   PAT@Example.com,Pat Smith,0,2024-01-15\n";
        let (records, errors) = parse_roster_csv(csv).unwrap();

        assert!(errors.is_empty());
        assert_eq!(records[0].email, "pat@example.com");
        assert_eq!(records[0].display_name, "Pat Smith");
        assert!(!records[0].is_guest);
        assert_eq!(
            records[0].join_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_import_reports_bad_rows_and_keeps_good_ones() {
        let csv = "email,join_date\n\
                   good@example.com,\n\
                   not-an-email,\n\
                   bad-date@example.com,someday\n";
        let (records, errors) = parse_roster_csv(csv).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "good@example.com");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("line 3"));
        assert!(errors[1].contains("line 4"));
    }

    #[test]
    fn test_export_roundtrips_through_import() {
        let member = Member {
            member_id: Uuid::now_v7(),
            email: "jane@example.com".to_string(),
            display_name: "Jane Doe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "555-0100".to_string(),
            is_guest: false,
            is_officer: false,
            is_active: true,
            email_verified: true,
            join_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            mentor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let csv = write_roster_csv(&[member]).unwrap();
        let (records, errors) = parse_roster_csv(&csv).unwrap();

        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "jane@example.com");
        assert_eq!(records[0].display_name, "Jane Doe");
        assert!(!records[0].is_guest);
        assert_eq!(records[0].phone_number, "555-0100");
    }
}
