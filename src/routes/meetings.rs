// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Meeting route handlers: agenda listing, role sign-up, the check-in kiosk,
//! guest conversion, reminder/feedback mail, and club configuration
//! (roles, agenda sessions, templates).

use crate::app::{AppState, CurrentMember, Officer};
use crate::models::auth::MessageResponse;
use crate::models::meeting::{
    staffing_label, BulkConvertRequest, BulkConvertResponse, CheckinResponse, ConvertGuestResponse,
    CreateMeetingRequest, CreateRoleRequest, CreateSessionRequest, CreateTemplateRequest,
    GuestCheckinRequest, KioskMemberInfo, KioskResponse, ListRolesResponse, ListSessionsResponse,
    ListTemplatesResponse, MeetingInfo, MeetingWithRoles, RoleInfo, RoleSlotInfo, SaveNoteRequest,
    SendFeedbackResponse, SendRemindersResponse, SessionInfo, TemplateInfo, ToggleRoleResponse,
    UpcomingMeetingsResponse, UpdateMeetingRequest,
};
use crate::models::member::MemberFilter;
use crate::services::db::CreateMeetingParams;
use crate::services::meetings::{
    build_feedback_emails, build_guest_thank_yous, build_reminder_emails,
    convert_guest_attendance, populate_from_template, toggle_member_checkin, toggle_role,
    ToggleOutcome,
};
use crate::services::agenda;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Create the meetings router.
pub fn meetings_router() -> Router<AppState> {
    Router::new()
        .route("/meetings", post(create_meeting_handler))
        .route("/meetings/upcoming", get(upcoming_meetings_handler))
        .route(
            "/meetings/{meeting_id}",
            axum::routing::patch(update_meeting_handler),
        )
        .route("/meetings/{meeting_id}/agenda", get(agenda_handler))
        .route(
            "/meetings/{meeting_id}/send-reminders",
            post(send_reminders_handler),
        )
        .route(
            "/meetings/{meeting_id}/send-feedback",
            post(send_feedback_handler),
        )
        .route(
            "/meetings/roles/{meeting_role_id}/toggle",
            post(toggle_role_handler),
        )
        .route(
            "/meetings/roles/{meeting_role_id}/note",
            put(save_role_note_handler),
        )
        .route(
            "/meetings/roles/{meeting_role_id}/admin-note",
            put(save_admin_note_handler),
        )
        .route("/kiosk", get(kiosk_handler))
        .route(
            "/kiosk/{meeting_id}/member/{member_id}",
            post(checkin_member_handler),
        )
        .route("/kiosk/{meeting_id}/guest", post(checkin_guest_handler))
        .route(
            "/attendance/{attendance_id}/convert",
            post(convert_guest_handler),
        )
        .route("/attendance/convert-guests", post(bulk_convert_handler))
        .route(
            "/roles",
            post(create_role_handler).get(list_roles_handler),
        )
        .route(
            "/agenda-sessions",
            post(create_session_handler).get(list_sessions_handler),
        )
        .route(
            "/templates",
            post(create_template_handler).get(list_templates_handler),
        )
}

fn db_error(e: sqlx::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {e}"),
    )
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
}

async fn meeting_with_roles(
    state: &AppState,
    meeting: crate::models::meeting::Meeting,
) -> Result<MeetingWithRoles, (StatusCode, String)> {
    let slots = state
        .db
        .list_role_slots(meeting.meeting_id)
        .await
        .map_err(db_error)?;
    let filled = slots.iter().filter(|s| !s.is_open()).count();
    let total = slots.len();
    Ok(MeetingWithRoles {
        meeting: MeetingInfo::from(meeting),
        roles: slots.into_iter().map(RoleSlotInfo::from).collect(),
        staffing: staffing_label(filled, total),
    })
}

// ============================================================================
// Meetings
// ============================================================================

/// POST /meetings - Create a meeting, populating roles from its template.
async fn create_meeting_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateMeetingRequest>,
) -> Result<Json<MeetingWithRoles>, (StatusCode, String)> {
    if !payload.video_link.is_empty() {
        url::Url::parse(&payload.video_link)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid video link: {e}")))?;
    }

    let meeting_id = state
        .db
        .create_meeting(&CreateMeetingParams {
            starts_at: payload.starts_at,
            theme: &payload.theme,
            word_of_the_day: &payload.word_of_the_day,
            video_link: &payload.video_link,
            template_id: payload.template_id,
        })
        .await
        .map_err(db_error)?;

    if let Some(template_id) = payload.template_id {
        populate_from_template(&state.db, meeting_id, template_id)
            .await
            .map_err(internal)?;
    }

    let meeting = state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    Ok(Json(meeting_with_roles(&state, meeting).await?))
}

/// GET /meetings/upcoming - Upcoming meetings with their role slots.
async fn upcoming_meetings_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
) -> Result<Json<UpcomingMeetingsResponse>, (StatusCode, String)> {
    let meetings = state
        .db
        .list_upcoming_meetings(Utc::now())
        .await
        .map_err(db_error)?;

    let mut out = Vec::with_capacity(meetings.len());
    for meeting in meetings {
        out.push(meeting_with_roles(&state, meeting).await?);
    }

    let count = out.len();
    Ok(Json(UpcomingMeetingsResponse {
        meetings: out,
        count,
    }))
}

/// PATCH /meetings/{meeting_id} - Update meeting fields.
async fn update_meeting_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(meeting_id): Path<Uuid>,
    Json(payload): Json<UpdateMeetingRequest>,
) -> Result<Json<MeetingInfo>, (StatusCode, String)> {
    let current = state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    let video_link = payload.video_link.unwrap_or(current.video_link);
    if !video_link.is_empty() {
        url::Url::parse(&video_link)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid video link: {e}")))?;
    }

    let updated = state
        .db
        .update_meeting_fields(
            meeting_id,
            payload.starts_at.unwrap_or(current.starts_at),
            &payload.theme.unwrap_or(current.theme),
            &payload.word_of_the_day.unwrap_or(current.word_of_the_day),
            &video_link,
        )
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    Ok(Json(MeetingInfo::from(updated)))
}

/// GET /meetings/{meeting_id}/agenda - Printable agenda document.
async fn agenda_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
    Path(meeting_id): Path<Uuid>,
) -> Result<Response, (StatusCode, String)> {
    let meeting = state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    let sessions = state
        .db
        .list_session_blocks(meeting_id)
        .await
        .map_err(db_error)?;
    let slots = state
        .db
        .list_role_slots(meeting_id)
        .await
        .map_err(db_error)?;

    let document = agenda::render_agenda(&meeting, &sessions, &slots);
    let filename = agenda::agenda_filename(&meeting);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        document,
    )
        .into_response())
}

// ============================================================================
// Role sign-up
// ============================================================================

/// POST /meetings/roles/{meeting_role_id}/toggle - Claim or drop a role slot.
async fn toggle_role_handler(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Path(meeting_role_id): Path<Uuid>,
) -> Result<Json<ToggleRoleResponse>, (StatusCode, String)> {
    let outcome = toggle_role(&state.db, meeting_role_id, member.member_id)
        .await
        .map_err(internal)?;

    match outcome {
        ToggleOutcome::NotFound => {
            Err((StatusCode::NOT_FOUND, "Role slot not found".to_string()))
        }
        ToggleOutcome::Conflict => Err((
            StatusCode::FORBIDDEN,
            "This role is already taken.".to_string(),
        )),
        ToggleOutcome::Claimed | ToggleOutcome::Dropped => {
            let slot = state
                .db
                .get_role_slot(meeting_role_id)
                .await
                .map_err(db_error)?
                .ok_or((StatusCode::NOT_FOUND, "Role slot not found".to_string()))?;
            Ok(Json(ToggleRoleResponse {
                success: true,
                slot: RoleSlotInfo::from(slot),
            }))
        }
    }
}

/// PUT /meetings/roles/{meeting_role_id}/note - Set the occupant note.
async fn save_role_note_handler(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    Path(meeting_role_id): Path<Uuid>,
    Json(payload): Json<SaveNoteRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let slot = state
        .db
        .get_meeting_role(meeting_role_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Role slot not found".to_string()))?;

    // Only the occupant or an officer may edit the note.
    if slot.member_id != Some(member.member_id) && !member.is_officer {
        return Err((
            StatusCode::FORBIDDEN,
            "Only the assigned member can edit this note".to_string(),
        ));
    }

    state
        .db
        .set_role_notes(meeting_role_id, &payload.notes)
        .await
        .map_err(db_error)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Note saved".to_string(),
    }))
}

/// PUT /meetings/roles/{meeting_role_id}/admin-note - Set officer feedback.
async fn save_admin_note_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(meeting_role_id): Path<Uuid>,
    Json(payload): Json<SaveNoteRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    if state
        .db
        .get_meeting_role(meeting_role_id)
        .await
        .map_err(db_error)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Role slot not found".to_string()));
    }

    state
        .db
        .set_role_admin_notes(meeting_role_id, &payload.notes)
        .await
        .map_err(db_error)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Feedback saved".to_string(),
    }))
}

// ============================================================================
// Check-in kiosk
// ============================================================================

/// GET /kiosk - Today's meeting (or the next one) with the member grid.
async fn kiosk_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
) -> Result<Json<KioskResponse>, (StatusCode, String)> {
    let now = Utc::now();
    let day_start = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);

    // Meeting happening today, else the closest upcoming one.
    let mut meeting = state
        .db
        .find_meeting_between(day_start, day_end)
        .await
        .map_err(db_error)?;
    if meeting.is_none() {
        meeting = state
            .db
            .list_upcoming_meetings(day_start)
            .await
            .map_err(db_error)?
            .into_iter()
            .next();
    }

    let Some(meeting) = meeting else {
        return Ok(Json(KioskResponse {
            meeting: None,
            members: Vec::new(),
            message: Some("No meeting found".to_string()),
        }));
    };

    let members = state
        .db
        .list_members(&MemberFilter {
            is_active: Some(true),
            ..Default::default()
        })
        .await
        .map_err(db_error)?;
    let checked_in = state
        .db
        .checked_in_member_ids(meeting.meeting_id)
        .await
        .map_err(db_error)?;

    let grid = members
        .into_iter()
        .map(|m| KioskMemberInfo {
            checked_in: checked_in.contains(&m.member_id),
            member_id: m.member_id,
            display_name: m.display_name,
        })
        .collect();

    Ok(Json(KioskResponse {
        meeting: Some(MeetingInfo::from(meeting)),
        members: grid,
        message: None,
    }))
}

/// POST /kiosk/{meeting_id}/member/{member_id} - Toggle a member check-in.
async fn checkin_member_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
    Path((meeting_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CheckinResponse>, (StatusCode, String)> {
    if state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Meeting not found".to_string()));
    }
    if state
        .db
        .get_member_by_id(member_id)
        .await
        .map_err(db_error)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Member not found".to_string()));
    }

    let present = toggle_member_checkin(&state.db, meeting_id, member_id)
        .await
        .map_err(internal)?;

    Ok(Json(CheckinResponse {
        success: true,
        present,
    }))
}

/// POST /kiosk/{meeting_id}/guest - Record a walk-in guest.
async fn checkin_guest_handler(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
    Json(payload): Json<GuestCheckinRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let name = payload.guest_name.trim();
    let email = payload.guest_email.trim();
    if name.is_empty() || email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Guest name and email are required".to_string(),
        ));
    }

    if state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Meeting not found".to_string()));
    }

    state
        .db
        .create_guest_attendance(meeting_id, name, email)
        .await
        .map_err(db_error)?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Welcome, {}!", name),
    }))
}

// ============================================================================
// Guest conversion
// ============================================================================

/// POST /attendance/{attendance_id}/convert - Convert one guest record.
async fn convert_guest_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(attendance_id): Path<Uuid>,
) -> Result<Json<ConvertGuestResponse>, (StatusCode, String)> {
    let outcome = convert_guest_attendance(&state.db, attendance_id)
        .await
        .map_err(internal)?
        .ok_or((
            StatusCode::NOT_FOUND,
            "Attendance record not found".to_string(),
        ))?;

    Ok(Json(ConvertGuestResponse {
        success: true,
        member_id: outcome.member_id,
        created: outcome.created,
        linked: outcome.linked,
    }))
}

/// POST /attendance/convert-guests - Convert a batch of guest records.
async fn bulk_convert_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<BulkConvertRequest>,
) -> Result<Json<BulkConvertResponse>, (StatusCode, String)> {
    let mut created = 0;
    let mut linked = 0;

    for attendance_id in payload.attendance_ids {
        if let Some(outcome) = convert_guest_attendance(&state.db, attendance_id)
            .await
            .map_err(internal)?
        {
            if outcome.created {
                created += 1;
            } else if outcome.linked {
                linked += 1;
            }
        }
    }

    Ok(Json(BulkConvertResponse { created, linked }))
}

// ============================================================================
// Reminder and feedback mail
// ============================================================================

/// POST /meetings/{meeting_id}/send-reminders - Remind assigned members and
/// beg unassigned members to fill open roles.
async fn send_reminders_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<SendRemindersResponse>, (StatusCode, String)> {
    let meeting = state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    let slots = state
        .db
        .list_role_slots(meeting_id)
        .await
        .map_err(db_error)?;
    let candidates = state
        .db
        .list_members(&MemberFilter {
            is_active: Some(true),
            is_guest: Some(false),
            ..Default::default()
        })
        .await
        .map_err(db_error)?;

    let messages = build_reminder_emails(
        &meeting,
        &slots,
        &candidates,
        &state.email.config().app_base_url,
    );

    let queued = state.email.send_batch(&messages).await.map_err(|e| {
        eprintln!("[MAIL] Failed to send reminders: {e:#}");
        (StatusCode::BAD_GATEWAY, format!("Failed to send reminders: {e}"))
    })?;

    Ok(Json(SendRemindersResponse {
        success: true,
        queued,
    }))
}

/// POST /meetings/{meeting_id}/send-feedback - Send role feedback and guest
/// thank-you emails.
async fn send_feedback_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<SendFeedbackResponse>, (StatusCode, String)> {
    let meeting = state
        .db
        .get_meeting(meeting_id)
        .await
        .map_err(db_error)?
        .ok_or((StatusCode::NOT_FOUND, "Meeting not found".to_string()))?;

    let slots = state
        .db
        .list_role_slots(meeting_id)
        .await
        .map_err(db_error)?;
    let attendance = state
        .db
        .list_attendance(meeting_id)
        .await
        .map_err(db_error)?;

    let feedback = build_feedback_emails(&meeting, &slots);
    let thank_yous = build_guest_thank_yous(&meeting, &attendance);

    let mut messages = feedback.clone();
    messages.extend(thank_yous.iter().cloned());

    state.email.send_batch(&messages).await.map_err(|e| {
        eprintln!("[MAIL] Failed to send feedback: {e:#}");
        (StatusCode::BAD_GATEWAY, format!("Failed to send feedback: {e}"))
    })?;

    Ok(Json(SendFeedbackResponse {
        success: true,
        feedback_sent: feedback.len(),
        guests_thanked: thank_yous.len(),
    }))
}

// ============================================================================
// Club configuration
// ============================================================================

/// POST /roles - Create a role definition.
async fn create_role_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<Json<RoleInfo>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Role name is required".to_string()));
    }

    let role_id = state
        .db
        .create_role(
            payload.name.trim(),
            payload.is_speech_role,
            payload.points,
            payload.time_minutes,
            payload.in_person,
        )
        .await
        .map_err(db_error)?;

    Ok(Json(RoleInfo {
        role_id,
        name: payload.name.trim().to_string(),
        is_speech_role: payload.is_speech_role,
        points: payload.points,
        time_minutes: payload.time_minutes,
        in_person: payload.in_person,
    }))
}

/// GET /roles - List role definitions.
async fn list_roles_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
) -> Result<Json<ListRolesResponse>, (StatusCode, String)> {
    let roles: Vec<RoleInfo> = state
        .db
        .list_roles()
        .await
        .map_err(db_error)?
        .into_iter()
        .map(RoleInfo::from)
        .collect();
    let count = roles.len();
    Ok(Json(ListRolesResponse { roles, count }))
}

/// POST /agenda-sessions - Create an agenda session definition.
async fn create_session_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionInfo>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Session name is required".to_string(),
        ));
    }

    let session_id = state
        .db
        .create_agenda_session(payload.name.trim(), payload.duration_minutes, payload.takes_roles)
        .await
        .map_err(db_error)?;

    Ok(Json(SessionInfo {
        session_id,
        name: payload.name.trim().to_string(),
        duration_minutes: payload.duration_minutes,
        takes_roles: payload.takes_roles,
    }))
}

/// GET /agenda-sessions - List agenda session definitions.
async fn list_sessions_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
) -> Result<Json<ListSessionsResponse>, (StatusCode, String)> {
    let sessions: Vec<SessionInfo> = state
        .db
        .list_agenda_sessions()
        .await
        .map_err(db_error)?
        .into_iter()
        .map(SessionInfo::from)
        .collect();
    let count = sessions.len();
    Ok(Json(ListSessionsResponse { sessions, count }))
}

/// POST /templates - Create a meeting template with sessions and role items.
async fn create_template_handler(
    State(state): State<AppState>,
    Officer(_officer): Officer,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<Json<TemplateInfo>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Template name is required".to_string(),
        ));
    }
    for item in &payload.role_items {
        if item.slot_count < 1 {
            return Err((
                StatusCode::BAD_REQUEST,
                "Role item count must be at least 1".to_string(),
            ));
        }
        // Role items may only sit in sessions that take roles.
        if let Some(session_id) = item.session_id {
            let session = state
                .db
                .get_agenda_session(session_id)
                .await
                .map_err(db_error)?
                .ok_or((
                    StatusCode::BAD_REQUEST,
                    format!("Unknown session {session_id}"),
                ))?;
            if !session.takes_roles {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Session '{}' does not take roles", session.name),
                ));
            }
        }
    }

    let template_id = state
        .db
        .create_template(payload.name.trim())
        .await
        .map_err(db_error)?;

    for session in &payload.sessions {
        state
            .db
            .add_template_session(
                template_id,
                session.session_id,
                session.sort_order,
                &session.notes,
            )
            .await
            .map_err(db_error)?;
    }
    for item in &payload.role_items {
        state
            .db
            .add_template_role_item(
                template_id,
                item.role_id,
                item.session_id,
                item.slot_count,
                item.sort_order,
            )
            .await
            .map_err(db_error)?;
    }

    Ok(Json(TemplateInfo {
        template_id,
        name: payload.name.trim().to_string(),
    }))
}

/// GET /templates - List meeting templates.
async fn list_templates_handler(
    State(state): State<AppState>,
    CurrentMember(_member): CurrentMember,
) -> Result<Json<ListTemplatesResponse>, (StatusCode, String)> {
    let templates: Vec<TemplateInfo> = state
        .db
        .list_templates()
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|t| TemplateInfo {
            template_id: t.template_id,
            name: t.name,
        })
        .collect();
    let count = templates.len();
    Ok(Json(ListTemplatesResponse { templates, count }))
}
