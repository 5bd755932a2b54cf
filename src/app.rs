// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, authenticated-member extractors, and router
//! construction.
//!
//! This module is `pub` so that integration tests can build a test router
//! directly without starting the full binary.

use crate::models::auth::AuthMember;
use crate::models::version::{HelpResponse, VersionResponse};
use crate::routes::{
    announcements_router, auth_router, meetings_router, members_router, ApiDoc, AuthState,
};
use crate::services::auth_middleware::extract_session_token;
use crate::services::db::Db;
use crate::services::email::EmailService;
use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_cookies::{CookieManagerLayer, Cookies};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `SPEAKUP_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("SPEAKUP_VERSION");

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub email: Arc<EmailService>,
    /// Validates session cookies and resolves the calling member.
    pub auth_state: AuthState,
}

// ---------------------------------------------------------------------------
// Authenticated-member extractors
// ---------------------------------------------------------------------------

/// Axum extractor for the authenticated member of the current request.
///
/// Reads the `speakup_session` cookie, validates it, and yields the member
/// context. Rejects with `401` when the cookie is missing or invalid.
pub struct CurrentMember(pub AuthMember);

impl FromRequestParts<AppState> for CurrentMember {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to read request cookies".to_string(),
                )
            })?;

        let session_token = extract_session_token(&cookies).ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            )
        })?;

        let member = state
            .auth_state
            .auth_service
            .validate_session(&session_token)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Session validation error: {e}"),
                )
            })?
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired session".to_string(),
                )
            })?;

        Ok(CurrentMember(member))
    }
}

/// Axum extractor that additionally requires the officer flag.
pub struct Officer(pub AuthMember);

impl FromRequestParts<AppState> for Officer {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentMember(member) = CurrentMember::from_request_parts(parts, state).await?;
        if !member.is_officer {
            return Err((
                StatusCode::FORBIDDEN,
                "Officer access required".to_string(),
            ));
        }
        Ok(Officer(member))
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "speakup-agent".to_string(),
        version: VERSION.to_string(),
    })
}

/// Role-dependent help payload: officers see the admin topics.
pub async fn help_handler(
    State(_state): State<AppState>,
    CurrentMember(member): CurrentMember,
) -> Json<HelpResponse> {
    let (audience, topics) = if member.is_officer {
        (
            "officer",
            vec![
                "Creating meetings from a template".to_string(),
                "Sending role reminders and feedback".to_string(),
                "Converting guests to members".to_string(),
                "Importing and exporting the roster".to_string(),
                "Sending announcements".to_string(),
            ],
        )
    } else {
        (
            "member",
            vec![
                "Claiming and dropping meeting roles".to_string(),
                "Checking in at the kiosk".to_string(),
                "Updating your speech title".to_string(),
            ],
        )
    };

    Json(HelpResponse {
        audience: audience.to_string(),
        topics,
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state.clone();

    let app = Router::new()
        .route("/version", get(version_handler))
        .route("/help", get(help_handler))
        .merge(meetings_router())
        .merge(members_router())
        .merge(announcements_router())
        .with_state(state);

    app.nest("/auth", auth_router().with_state(auth_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CookieManagerLayer::new())
}
