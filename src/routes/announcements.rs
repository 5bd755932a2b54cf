// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Announcement route handlers: create, list, and bulk-send.

use crate::app::{AppState, Officer};
use crate::models::announcement::{
    AnnouncementInfo, CreateAnnouncementRequest, ListAnnouncementsResponse,
    SendAnnouncementResponse,
};
use crate::services::announcements::send_announcement;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

/// Create the announcements router. Announcements are officer-only.
pub fn announcements_router() -> Router<AppState> {
    Router::new()
        .route(
            "/announcements",
            post(create_announcement_handler).get(list_announcements_handler),
        )
        .route(
            "/announcements/{announcement_id}/send",
            post(send_announcement_handler),
        )
}

fn db_error(e: sqlx::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {e}"),
    )
}

/// POST /announcements - Create an announcement.
async fn create_announcement_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> Result<Json<AnnouncementInfo>, (StatusCode, String)> {
    if payload.subject.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Subject is required".to_string()));
    }

    let announcement_id = state
        .db
        .create_announcement(
            payload.subject.trim(),
            &payload.body,
            payload.audience.as_str(),
        )
        .await
        .map_err(db_error)?;

    let announcement = state
        .db
        .get_announcement(announcement_id)
        .await
        .map_err(db_error)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Announcement not found".to_string(),
        ))?;

    Ok(Json(AnnouncementInfo::from(announcement)))
}

/// GET /announcements - List announcements, newest first.
async fn list_announcements_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
) -> Result<Json<ListAnnouncementsResponse>, (StatusCode, String)> {
    let announcements: Vec<AnnouncementInfo> = state
        .db
        .list_announcements()
        .await
        .map_err(db_error)?
        .into_iter()
        .map(AnnouncementInfo::from)
        .collect();
    let count = announcements.len();
    Ok(Json(ListAnnouncementsResponse {
        announcements,
        count,
    }))
}

/// POST /announcements/{announcement_id}/send - Email the audience and stamp
/// `sent_at`.
async fn send_announcement_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(announcement_id): Path<Uuid>,
) -> Result<Json<SendAnnouncementResponse>, (StatusCode, String)> {
    let announcement = state
        .db
        .get_announcement(announcement_id)
        .await
        .map_err(db_error)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Announcement not found".to_string(),
        ))?;

    let recipients = send_announcement(&state.db, &state.email, announcement_id)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to send announcement: {e}"),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Announcement not found".to_string(),
        ))?;

    Ok(Json(SendAnnouncementResponse {
        success: true,
        recipients,
        message: format!(
            "Sent '{}' to {} recipients.",
            announcement.subject, recipients
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcements_router_creation() {
        let _router: Router<AppState> = announcements_router();
    }
}
