// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which members an announcement goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// All active members
    All,
    /// Officers only
    Officers,
    /// Guests only
    Guests,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Officers => "officers",
            Audience::Guests => "guests",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Audience::All),
            "officers" => Some(Audience::Officers),
            "guests" => Some(Audience::Guests),
            _ => None,
        }
    }
}

/// Announcement record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Announcement {
    pub announcement_id: Uuid,
    pub subject: String,
    pub body: String,
    /// Stored as text; parse with [`Audience::parse`].
    pub audience: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn audience(&self) -> Audience {
        Audience::parse(&self.audience).unwrap_or(Audience::All)
    }
}

// ============================================================================
// API Request Types
// ============================================================================

/// Request to create an announcement.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAnnouncementRequest {
    pub subject: String,
    pub body: String,
    #[serde(default = "default_audience")]
    pub audience: Audience,
}

fn default_audience() -> Audience {
    Audience::All
}

// ============================================================================
// API Response Types
// ============================================================================

/// Announcement as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementInfo {
    pub announcement_id: Uuid,
    pub subject: String,
    pub audience: Audience,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl From<Announcement> for AnnouncementInfo {
    fn from(a: Announcement) -> Self {
        let audience = a.audience();
        AnnouncementInfo {
            announcement_id: a.announcement_id,
            subject: a.subject,
            audience,
            created_at: a.created_at,
            sent_at: a.sent_at,
        }
    }
}

/// Response for the announcement listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAnnouncementsResponse {
    pub announcements: Vec<AnnouncementInfo>,
    pub count: usize,
}

/// Response after sending an announcement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendAnnouncementResponse {
    pub success: bool,
    pub recipients: usize,
    pub message: String,
}
