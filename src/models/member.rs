// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Member records. Guests and official members share one table and are
//! distinguished by the `is_guest` flag; officers can manage meeting agendas
//! and send club email.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Member record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub member_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_guest: bool,
    pub is_officer: bool,
    pub is_active: bool,
    pub email_verified: bool,
    pub join_date: Option<NaiveDate>,
    /// Each member may have one mentor; deleting the mentor clears this.
    pub mentor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Human-readable membership status.
    pub fn status_label(&self) -> &'static str {
        if self.is_guest {
            "Guest"
        } else {
            "Member"
        }
    }
}

// ============================================================================
// API Request Types
// ============================================================================

/// Request to create a member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMemberRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default)]
    pub is_officer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

/// Request to update a member. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_officer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<Uuid>,
}

/// Roster list filters (query string).
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MemberFilter {
    pub is_guest: Option<bool>,
    pub is_officer: Option<bool>,
    pub is_active: Option<bool>,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Member as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberInfo {
    pub member_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_guest: bool,
    pub is_officer: bool,
    pub is_active: bool,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<Uuid>,
}

impl From<Member> for MemberInfo {
    fn from(m: Member) -> Self {
        let status_label = m.status_label().to_string();
        MemberInfo {
            member_id: m.member_id,
            email: m.email,
            display_name: m.display_name,
            first_name: m.first_name,
            last_name: m.last_name,
            phone_number: m.phone_number,
            is_guest: m.is_guest,
            is_officer: m.is_officer,
            is_active: m.is_active,
            status_label,
            join_date: m.join_date,
            mentor_id: m.mentor_id,
        }
    }
}

/// Response for the roster listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberListResponse {
    pub members: Vec<MemberInfo>,
    pub count: usize,
}

/// Outcome of a CSV roster import.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    /// Row-level problems; rows with errors are skipped, the rest are applied.
    pub errors: Vec<String>,
}
