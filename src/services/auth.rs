// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Authentication service for magic link and session management.

use crate::models::auth::AuthMember;
use crate::models::member::Member;
use crate::services::auth_db::{AuthDbClient, CreateMagicLinkParams, CreateSessionParams};
use crate::services::email::EmailService;
use crate::services::logging::anonymize_email;
use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::Arc;

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in days
    pub session_max_age_days: u64,
    /// Magic link expiry in minutes
    pub magic_link_expiry_minutes: u64,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            session_max_age_days: env::var("SESSION_MAX_AGE_DAYS")
                .unwrap_or_else(|_| "365".to_string())
                .parse()
                .unwrap_or(365),
            magic_link_expiry_minutes: env::var("MAGIC_LINK_EXPIRY_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
        }
    }
}

/// Authentication service.
pub struct AuthService {
    db: AuthDbClient,
    email: Arc<EmailService>,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: AuthDbClient, email: Arc<EmailService>, config: AuthConfig) -> Self {
        Self { db, email, config }
    }

    // ========== Token Generation ==========

    /// Generate a secure random token.
    /// Returns (raw_token, hash) - raw_token is sent to user, hash is stored in DB.
    pub fn generate_token() -> (String, String) {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw_token = hex::encode(bytes);
        let hash = Self::hash_token(&raw_token);
        (raw_token, hash)
    }

    /// Hash a token for storage.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    // ========== Magic Link Flow ==========

    /// Request a magic link for authentication.
    /// Sends an email with a link to verify and create a session.
    pub async fn request_magic_link(&self, email: &str) -> Result<()> {
        let (raw_token, token_hash) = Self::generate_token();

        let expires_at =
            Utc::now() + Duration::minutes(self.config.magic_link_expiry_minutes as i64);

        self.db
            .create_magic_link_token(&CreateMagicLinkParams {
                token_hash: &token_hash,
                email,
                expires_at,
            })
            .await
            .context("Failed to create magic link token")?;

        self.email
            .send_magic_link(email, &raw_token)
            .await
            .context("Failed to send magic link email")?;

        Ok(())
    }

    /// Verify a magic link and create a session.
    /// Returns the session token and the signed-in member.
    pub async fn verify_magic_link(
        &self,
        token: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<(String, Member)> {
        let token_hash = Self::hash_token(token);

        // Get and validate token
        let magic_token = self
            .db
            .get_magic_link_token(&token_hash)
            .await
            .context("Failed to get magic link token")?
            .ok_or_else(|| anyhow!("Invalid or expired token"))?;

        if !magic_token.is_valid() {
            eprintln!(
                "[AUTH] Magic link verification failed for {}: token expired or already used",
                anonymize_email(&magic_token.email)
            );
            return Err(anyhow!("Token is expired or already used"));
        }

        // Mark token as used immediately to prevent reuse
        self.db
            .mark_magic_link_used(&token_hash)
            .await
            .context("Failed to mark token as used")?;

        // Get or create member
        let member = self.get_or_create_member(&magic_token.email).await?;

        // Create session
        let session_token = self
            .create_member_session(member.member_id, user_agent, ip_address)
            .await?;

        println!(
            "[AUTH] Member signed in via magic link: member_id={}, email={}{}",
            member.member_id,
            anonymize_email(&member.email),
            ip_address
                .map(|ip| format!(", ip={}", ip))
                .unwrap_or_default()
        );

        Ok((session_token, member))
    }

    /// Get an existing member by email, or create a new guest member.
    async fn get_or_create_member(&self, email: &str) -> Result<Member> {
        match self
            .db
            .get_member_by_email(email)
            .await
            .context("Failed to get member")?
        {
            Some(member) => {
                if !member.email_verified {
                    self.db
                        .set_member_email_verified(member.member_id)
                        .await
                        .context("Failed to verify email")?;
                }
                Ok(member)
            }
            None => {
                let member_id = self
                    .db
                    .create_member_from_email(email)
                    .await
                    .context("Failed to create member")?;

                self.db
                    .set_member_email_verified(member_id)
                    .await
                    .context("Failed to verify email")?;

                println!(
                    "[AUTH] New guest member created via sign-in: member_id={}, email={}",
                    member_id,
                    anonymize_email(email)
                );

                self.db
                    .get_member_by_id(member_id)
                    .await
                    .context("Failed to get new member")?
                    .ok_or_else(|| anyhow!("Member creation failed"))
            }
        }
    }

    /// Create a session for a member and return the session token.
    async fn create_member_session(
        &self,
        member_id: uuid::Uuid,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<String> {
        let (session_token, session_hash) = Self::generate_token();
        let expires_at = Utc::now() + Duration::days(self.config.session_max_age_days as i64);

        self.db
            .create_session(&CreateSessionParams {
                session_id_hash: &session_hash,
                member_id,
                expires_at,
                user_agent,
                ip_address,
            })
            .await
            .context("Failed to create session")?;

        Ok(session_token)
    }

    // ========== Session Management ==========

    /// Validate a session and return the authenticated member context.
    pub async fn validate_session(&self, session_token: &str) -> Result<Option<AuthMember>> {
        let session_hash = Self::hash_token(session_token);

        let session = match self
            .db
            .get_session(&session_hash)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            // Clean up expired session
            self.db
                .delete_session(&session_hash)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let member = self
            .db
            .get_member_by_id(session.member_id)
            .await
            .context("Failed to get member")?
            .ok_or_else(|| anyhow!("Member not found"))?;

        if !member.is_active {
            return Ok(None);
        }

        // Update last active time (fire and forget)
        let _ = self.db.touch_session(&session_hash).await;

        Ok(Some(AuthMember {
            member_id: member.member_id,
            email: member.email,
            display_name: member.display_name,
            is_officer: member.is_officer,
        }))
    }

    /// Sign out - invalidate session.
    pub async fn sign_out(&self, session_token: &str) -> Result<()> {
        let session_hash = Self::hash_token(session_token);
        self.db
            .delete_session(&session_hash)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Sign out all sessions for a member.
    pub async fn sign_out_all(&self, member_id: uuid::Uuid) -> Result<()> {
        self.db
            .delete_member_sessions(member_id)
            .await
            .context("Failed to delete all sessions")?;
        Ok(())
    }

    /// Full member row for the `/auth/me` endpoint.
    pub async fn get_member_by_id(&self, member_id: uuid::Uuid) -> Result<Option<Member>> {
        self.db
            .get_member_by_id(member_id)
            .await
            .context("Failed to get member")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_produces_unique_tokens() {
        let (token1, _) = AuthService::generate_token();
        let (token2, _) = AuthService::generate_token();
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_generate_token_produces_valid_hex() {
        let (token, hash) = AuthService::generate_token();
        assert_eq!(token.len(), 64); // 32 bytes = 64 hex chars
        assert_eq!(hash.len(), 64); // SHA-256 = 64 hex chars
        assert!(hex::decode(&token).is_ok());
        assert!(hex::decode(&hash).is_ok());
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = "test_token_123";
        let hash1 = AuthService::hash_token(token);
        let hash2 = AuthService::hash_token(token);
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_token_differs_for_different_tokens() {
        let hash1 = AuthService::hash_token("token1");
        let hash2 = AuthService::hash_token("token2");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_auth_config_defaults() {
        // Clear env vars to test defaults
        env::remove_var("SESSION_MAX_AGE_DAYS");
        env::remove_var("MAGIC_LINK_EXPIRY_MINUTES");

        let config = AuthConfig::from_env();
        assert_eq!(config.session_max_age_days, 365);
        assert_eq!(config.magic_link_expiry_minutes, 15);
    }
}
