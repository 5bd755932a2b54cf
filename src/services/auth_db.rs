// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Database operations for authentication: magic link tokens, sessions, and
//! the member lookups the sign-in flow needs.

use crate::models::auth::{MagicLinkToken, Session};
use crate::models::member::Member;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Parameters for creating a session.
pub struct CreateSessionParams<'a> {
    pub session_id_hash: &'a str,
    pub member_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
}

/// Parameters for creating a magic link token.
pub struct CreateMagicLinkParams<'a> {
    pub token_hash: &'a str,
    pub email: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// Authentication database client.
#[derive(Clone)]
pub struct AuthDbClient {
    pool: PgPool,
}

impl AuthDbClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========== Member Operations ==========

    /// Get a member by email.
    pub async fn get_member_by_email(&self, email: &str) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT member_id, email, display_name, first_name, last_name, phone_number, \
             is_guest, is_officer, is_active, email_verified, join_date, mentor_id, \
             created_at, updated_at FROM members WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get a member by ID.
    pub async fn get_member_by_id(&self, member_id: Uuid) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT member_id, email, display_name, first_name, last_name, phone_number, \
             is_guest, is_officer, is_active, email_verified, join_date, mentor_id, \
             created_at, updated_at FROM members WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create a minimal guest member for a first-time sign-in.
    /// The display name defaults to the email local-part.
    pub async fn create_member_from_email(&self, email: &str) -> Result<Uuid, sqlx::Error> {
        let member_id = Uuid::now_v7();
        let display_name = email.split('@').next().unwrap_or(email);
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO members \
             (member_id, email, display_name, is_guest, is_officer, is_active, \
              email_verified, created_at, updated_at) \
             VALUES ($1, $2, $3, TRUE, FALSE, TRUE, FALSE, $4, $4)",
        )
        .bind(member_id)
        .bind(email)
        .bind(display_name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(member_id)
    }

    /// Mark a member's email as verified.
    pub async fn set_member_email_verified(&self, member_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE members SET email_verified = TRUE, updated_at = $2 WHERE member_id = $1",
        )
        .bind(member_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ========== Session Operations ==========

    /// Create a new session.
    pub async fn create_session(&self, params: &CreateSessionParams<'_>) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO sessions \
             (session_id, member_id, created_at, expires_at, last_active_at, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $3, $5, $6)",
        )
        .bind(params.session_id_hash)
        .bind(params.member_id)
        .bind(now)
        .bind(params.expires_at)
        .bind(params.user_agent)
        .bind(params.ip_address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a session by its hash.
    pub async fn get_session(&self, session_id_hash: &str) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT session_id, member_id, created_at, expires_at, last_active_at, \
             user_agent, ip_address FROM sessions WHERE session_id = $1",
        )
        .bind(session_id_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a session.
    pub async fn delete_session(&self, session_id_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete all sessions for a member.
    pub async fn delete_member_sessions(&self, member_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update session's last active time.
    pub async fn touch_session(&self, session_id_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET last_active_at = $2 WHERE session_id = $1")
            .bind(session_id_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ========== Magic Link Token Operations ==========

    /// Create a magic link token.
    pub async fn create_magic_link_token(
        &self,
        params: &CreateMagicLinkParams<'_>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO magic_link_tokens (token_hash, email, created_at, expires_at, used) \
             VALUES ($1, $2, $3, $4, FALSE)",
        )
        .bind(params.token_hash)
        .bind(params.email)
        .bind(Utc::now())
        .bind(params.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a magic link token.
    pub async fn get_magic_link_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<MagicLinkToken>, sqlx::Error> {
        sqlx::query_as::<_, MagicLinkToken>(
            "SELECT token_hash, email, created_at, expires_at, used \
             FROM magic_link_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Mark a magic link token as used.
    pub async fn mark_magic_link_used(&self, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE magic_link_tokens SET used = TRUE WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
