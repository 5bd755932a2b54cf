// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Meetings and everything hanging off them: role definitions, agenda
//! sessions, meeting templates, per-meeting role slots, and attendance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// Database Models
// ============================================================================

/// A role that can be filled at a meeting (e.g. Toastmaster, Timer,
/// Ah-Counter).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub name: String,
    pub is_speech_role: bool,
    /// Points for difficulty/effort.
    pub points: i32,
    pub time_minutes: i32,
    pub in_person: bool,
}

/// A named agenda section (e.g. "Prepared Speeches", "Table Topics").
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgendaSession {
    pub session_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    /// Only sessions that take roles may carry template role items.
    pub takes_roles: bool,
}

/// A reusable meeting blueprint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingTemplate {
    pub template_id: Uuid,
    pub name: String,
}

/// Agenda session scheduled by a template.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateSession {
    pub template_session_id: Uuid,
    pub template_id: Uuid,
    pub session_id: Uuid,
    pub sort_order: i32,
    pub notes: String,
}

/// Role item scheduled by a template; `slot_count` open slots are created
/// per item when a meeting is populated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateRoleItem {
    pub item_id: Uuid,
    pub template_id: Uuid,
    pub role_id: Uuid,
    pub session_id: Option<Uuid>,
    pub slot_count: i32,
    pub sort_order: i32,
}

/// Meeting record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Meeting {
    pub meeting_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub theme: String,
    pub word_of_the_day: String,
    pub video_link: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Agenda session instance attached to a concrete meeting.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingSession {
    pub meeting_session_id: Uuid,
    pub meeting_id: Uuid,
    pub session_id: Uuid,
    pub sort_order: i32,
    pub notes: String,
}

/// The pivot row: one fillable role slot at one meeting.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingRole {
    pub meeting_role_id: Uuid,
    pub meeting_id: Uuid,
    pub role_id: Uuid,
    pub session_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub backup_member_id: Option<Uuid>,
    /// Occupant-facing note (speech title etc.).
    pub notes: String,
    /// Officer feedback, delivered by the feedback mailer.
    pub admin_notes: String,
    pub sort_order: i32,
}

/// Role slot joined with its role definition and occupant, as used by the
/// agenda view and the mailers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoleSlot {
    pub meeting_role_id: Uuid,
    pub meeting_id: Uuid,
    pub role_id: Uuid,
    pub role_name: String,
    pub is_speech_role: bool,
    pub member_id: Option<Uuid>,
    pub member_display_name: Option<String>,
    pub member_first_name: Option<String>,
    pub member_email: Option<String>,
    pub notes: String,
    pub admin_notes: String,
    pub sort_order: i32,
}

impl RoleSlot {
    pub fn is_open(&self) -> bool {
        self.member_id.is_none()
    }
}

/// Attendance record: either a member check-in or a walk-in guest.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Attendance {
    pub attendance_id: Uuid,
    pub meeting_id: Uuid,
    pub member_id: Option<Uuid>,
    pub guest_name: String,
    pub guest_email: String,
    pub recorded_at: DateTime<Utc>,
}

impl Attendance {
    /// Walk-in guests have no linked member row.
    pub fn is_guest(&self) -> bool {
        self.member_id.is_none()
    }
}

/// "3/4 Roles Filled" staffing summary shown on meeting listings.
pub fn staffing_label(filled: usize, total: usize) -> String {
    format!("{}/{} Roles Filled", filled, total)
}

// ============================================================================
// API Request Types
// ============================================================================

/// Request to create a meeting.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMeetingRequest {
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub word_of_the_day: String,
    /// Optional video conferencing link; validated as a URL when present.
    #[serde(default)]
    pub video_link: String,
    /// Template to populate sessions and role slots from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
}

/// Request to update meeting fields. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateMeetingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_of_the_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
}

/// Request to set the note on a role slot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SaveNoteRequest {
    pub notes: String,
}

/// Guest check-in form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GuestCheckinRequest {
    pub guest_name: String,
    pub guest_email: String,
}

/// Bulk guest-to-member conversion.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BulkConvertRequest {
    pub attendance_ids: Vec<Uuid>,
}

/// Request to create a role definition.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub is_speech_role: bool,
    #[serde(default = "default_points")]
    pub points: i32,
    #[serde(default)]
    pub time_minutes: i32,
    #[serde(default = "default_true")]
    pub in_person: bool,
}

fn default_points() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// Request to create an agenda session definition.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateSessionRequest {
    pub name: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub takes_roles: bool,
}

/// One agenda session scheduled by a template being created.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TemplateSessionSpec {
    pub session_id: Uuid,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub notes: String,
}

/// One role item scheduled by a template being created.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TemplateRoleItemSpec {
    pub role_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(default = "default_slot_count")]
    pub slot_count: i32,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_slot_count() -> i32 {
    1
}

/// Request to create a meeting template with its children.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<TemplateSessionSpec>,
    #[serde(default)]
    pub role_items: Vec<TemplateRoleItemSpec>,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Meeting as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeetingInfo {
    pub meeting_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub theme: String,
    pub word_of_the_day: String,
    pub video_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
}

impl From<Meeting> for MeetingInfo {
    fn from(m: Meeting) -> Self {
        MeetingInfo {
            meeting_id: m.meeting_id,
            starts_at: m.starts_at,
            theme: m.theme,
            word_of_the_day: m.word_of_the_day,
            video_link: m.video_link,
            template_id: m.template_id,
        }
    }
}

/// Role slot as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleSlotInfo {
    pub meeting_role_id: Uuid,
    pub role_name: String,
    pub is_speech_role: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    pub notes: String,
    pub sort_order: i32,
    pub is_open: bool,
}

impl From<RoleSlot> for RoleSlotInfo {
    fn from(s: RoleSlot) -> Self {
        let is_open = s.is_open();
        RoleSlotInfo {
            meeting_role_id: s.meeting_role_id,
            role_name: s.role_name,
            is_speech_role: s.is_speech_role,
            member_id: s.member_id,
            member_name: s.member_display_name,
            notes: s.notes,
            sort_order: s.sort_order,
            is_open,
        }
    }
}

/// One upcoming meeting with its role slots and staffing summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeetingWithRoles {
    #[serde(flatten)]
    pub meeting: MeetingInfo,
    pub roles: Vec<RoleSlotInfo>,
    pub staffing: String,
}

/// Response for the upcoming meetings listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpcomingMeetingsResponse {
    pub meetings: Vec<MeetingWithRoles>,
    pub count: usize,
}

/// Response after toggling a role slot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleRoleResponse {
    pub success: bool,
    pub slot: RoleSlotInfo,
}

/// One member tile on the check-in kiosk grid.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KioskMemberInfo {
    pub member_id: Uuid,
    pub display_name: String,
    pub checked_in: bool,
}

/// Response for the check-in kiosk.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KioskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingInfo>,
    pub members: Vec<KioskMemberInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response after toggling a member check-in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckinResponse {
    pub success: bool,
    /// Whether the member is present after the toggle.
    pub present: bool,
}

/// Response after converting one guest attendance record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertGuestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    /// A new member row was created.
    pub created: bool,
    /// The record was linked (to a new or existing member).
    pub linked: bool,
}

/// Response after bulk guest conversion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkConvertResponse {
    pub created: usize,
    pub linked: usize,
}

/// Response after queueing reminder emails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendRemindersResponse {
    pub success: bool,
    pub queued: usize,
}

/// Response after sending feedback and guest thank-you emails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendFeedbackResponse {
    pub success: bool,
    pub feedback_sent: usize,
    pub guests_thanked: usize,
}

/// Role definition as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleInfo {
    pub role_id: Uuid,
    pub name: String,
    pub is_speech_role: bool,
    pub points: i32,
    pub time_minutes: i32,
    pub in_person: bool,
}

impl From<Role> for RoleInfo {
    fn from(r: Role) -> Self {
        RoleInfo {
            role_id: r.role_id,
            name: r.name,
            is_speech_role: r.is_speech_role,
            points: r.points,
            time_minutes: r.time_minutes,
            in_person: r.in_person,
        }
    }
}

/// Agenda session definition as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub takes_roles: bool,
}

impl From<AgendaSession> for SessionInfo {
    fn from(s: AgendaSession) -> Self {
        SessionInfo {
            session_id: s.session_id,
            name: s.name,
            duration_minutes: s.duration_minutes,
            takes_roles: s.takes_roles,
        }
    }
}

/// Meeting template as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateInfo {
    pub template_id: Uuid,
    pub name: String,
}

/// Response for the role definition listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListRolesResponse {
    pub roles: Vec<RoleInfo>,
    pub count: usize,
}

/// Response for the agenda session listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionInfo>,
    pub count: usize,
}

/// Response for the template listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateInfo>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staffing_label() {
        assert_eq!(staffing_label(3, 4), "3/4 Roles Filled");
        assert_eq!(staffing_label(0, 0), "0/0 Roles Filled");
    }

    #[test]
    fn test_role_slot_open() {
        let slot = RoleSlot {
            meeting_role_id: Uuid::now_v7(),
            meeting_id: Uuid::now_v7(),
            role_id: Uuid::now_v7(),
            role_name: "Timer".to_string(),
            is_speech_role: false,
            member_id: None,
            member_display_name: None,
            member_first_name: None,
            member_email: None,
            notes: String::new(),
            admin_notes: String::new(),
            sort_order: 0,
        };
        assert!(slot.is_open());

        let taken = RoleSlot {
            member_id: Some(Uuid::now_v7()),
            ..slot
        };
        assert!(!taken.is_open());
    }

    #[test]
    fn test_attendance_guest_flag() {
        let guest = Attendance {
            attendance_id: Uuid::now_v7(),
            meeting_id: Uuid::now_v7(),
            member_id: None,
            guest_name: "Jane Doe".to_string(),
            guest_email: "jane@example.com".to_string(),
            recorded_at: Utc::now(),
        };
        assert!(guest.is_guest());

        let member = Attendance {
            member_id: Some(Uuid::now_v7()),
            ..guest
        };
        assert!(!member.is_guest());
    }
}
