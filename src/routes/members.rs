// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Member roster route handlers, including CSV import/export.

use crate::app::{AppState, Officer};
use crate::models::member::{
    CreateMemberRequest, ImportReport, MemberFilter, MemberInfo, MemberListResponse,
    UpdateMemberRequest,
};
use crate::services::db::CreateMemberParams;
use crate::services::logging::anonymize_email;
use crate::services::roster::{parse_roster_csv, write_roster_csv};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

/// Create the members router. All roster management is officer-only.
pub fn members_router() -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            post(create_member_handler).get(list_members_handler),
        )
        .route(
            "/members/{member_id}",
            axum::routing::patch(update_member_handler),
        )
        .route("/members/export", get(export_members_handler))
        .route("/members/import", post(import_members_handler))
}

fn db_error(e: sqlx::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {e}"),
    )
}

/// GET /members - Roster listing with optional flag filters.
async fn list_members_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<MemberListResponse>, (StatusCode, String)> {
    let members: Vec<MemberInfo> = state
        .db
        .list_members(&filter)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(MemberInfo::from)
        .collect();
    let count = members.len();
    Ok(Json(MemberListResponse { members, count }))
}

/// POST /members - Create a member.
async fn create_member_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<Json<MemberInfo>, (StatusCode, String)> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "Invalid email".to_string()));
    }
    if payload.display_name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Display name is required".to_string(),
        ));
    }

    let member_id = state
        .db
        .create_member(&CreateMemberParams {
            email: &email,
            display_name: payload.display_name.trim(),
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            phone_number: payload.phone_number.trim(),
            is_guest: payload.is_guest,
            is_officer: payload.is_officer,
            join_date: payload.join_date,
        })
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => (
                StatusCode::CONFLICT,
                format!("A member with email {} already exists", anonymize_email(&email)),
            ),
            _ => db_error(e),
        })?;

    let member = state
        .db
        .get_member_by_id(member_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Member not found".to_string()))?;

    Ok(Json(MemberInfo::from(member)))
}

/// PATCH /members/{member_id} - Update profile fields and flags.
async fn update_member_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<MemberInfo>, (StatusCode, String)> {
    if let Some(mentor_id) = payload.mentor_id {
        if mentor_id == member_id {
            return Err((
                StatusCode::BAD_REQUEST,
                "A member cannot mentor themselves".to_string(),
            ));
        }
        if state
            .db
            .get_member_by_id(mentor_id)
            .await
            .map_err(db_error)?
            .is_none()
        {
            return Err((StatusCode::BAD_REQUEST, "Mentor not found".to_string()));
        }
    }

    let member = state
        .db
        .update_member(member_id, &payload)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Member not found".to_string()))?;

    Ok(Json(MemberInfo::from(member)))
}

/// GET /members/export - Roster as a CSV attachment.
async fn export_members_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
) -> Result<Response, (StatusCode, String)> {
    let members = state
        .db
        .list_members(&MemberFilter::default())
        .await
        .map_err(db_error)?;

    let csv = write_roster_csv(&members).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export roster: {e}"),
        )
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"members.csv\"".to_string(),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /members/import - Upsert roster rows from a CSV body.
async fn import_members_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    body: String,
) -> Result<Json<ImportReport>, (StatusCode, String)> {
    let (records, mut errors) = parse_roster_csv(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid CSV: {e}")))?;

    let mut created = 0;
    let mut updated = 0;

    for record in records {
        let result = state
            .db
            .upsert_roster_member(&CreateMemberParams {
                email: &record.email,
                display_name: &record.display_name,
                first_name: &record.first_name,
                last_name: &record.last_name,
                phone_number: &record.phone_number,
                is_guest: record.is_guest,
                is_officer: false,
                join_date: record.join_date,
            })
            .await;
        match result {
            Ok(true) => created += 1,
            Ok(false) => updated += 1,
            Err(e) => errors.push(format!(
                "{}: {}",
                anonymize_email(&record.email),
                e
            )),
        }
    }

    println!(
        "[ROSTER] Imported members: created={}, updated={}, errors={}",
        created,
        updated,
        errors.len()
    );

    Ok(Json(ImportReport {
        created,
        updated,
        errors,
    }))
}
