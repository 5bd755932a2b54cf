// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// Database Models
// ============================================================================

/// Session record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// SHA-256 hash of the raw session token.
    pub session_id: String,
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Magic link token record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MagicLinkToken {
    /// SHA-256 hash of the raw token sent by email.
    pub token_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl MagicLinkToken {
    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Check if the token is valid (not expired and not used)
    pub fn is_valid(&self) -> bool {
        !self.used && !self.is_expired()
    }
}

// ============================================================================
// Authenticated Member Context
// ============================================================================

/// Authenticated member context extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthMember {
    pub member_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_officer: bool,
}

impl AuthMember {
    /// Officers manage agendas, the roster, and outbound club email.
    pub fn can_manage_club(&self) -> bool {
        self.is_officer
    }
}

// ============================================================================
// API Request Types
// ============================================================================

/// Request to send a magic link for authentication.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RequestLinkRequest {
    /// Email address to send the magic link to
    pub email: String,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Response after requesting a magic link.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestLinkResponse {
    pub success: bool,
    pub message: String,
}

/// Response after verifying a magic link.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyLinkResponse {
    pub success: bool,
    pub message: String,
}

/// Current authenticated member information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub member_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_officer: bool,
    pub status_label: String,
}

/// Generic message response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry() {
        let expired = Session {
            session_id: "test".to_string(),
            member_id: Uuid::now_v7(),
            created_at: Utc::now() - Duration::hours(2),
            expires_at: Utc::now() - Duration::hours(1),
            last_active_at: Utc::now() - Duration::hours(1),
            user_agent: None,
            ip_address: None,
        };
        assert!(expired.is_expired());

        let valid = Session {
            expires_at: Utc::now() + Duration::hours(1),
            ..expired
        };
        assert!(!valid.is_expired());
    }

    #[test]
    fn test_magic_link_validity() {
        let token = MagicLinkToken {
            token_hash: "test".to_string(),
            email: "test@example.com".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(15),
            used: false,
        };
        assert!(token.is_valid());

        let used = MagicLinkToken {
            used: true,
            ..token.clone()
        };
        assert!(!used.is_valid());

        let expired = MagicLinkToken {
            expires_at: Utc::now() - Duration::minutes(1),
            ..token
        };
        assert!(!expired.is_valid());
    }

    #[test]
    fn test_officer_permissions() {
        let officer = AuthMember {
            member_id: Uuid::now_v7(),
            email: "officer@example.com".to_string(),
            display_name: "Officer".to_string(),
            is_officer: true,
        };
        assert!(officer.can_manage_club());

        let member = AuthMember {
            is_officer: false,
            ..officer
        };
        assert!(!member.can_manage_club());
    }
}
