// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Route handlers for the HTTP API.

pub mod announcements;
pub mod auth;
pub mod meetings;
pub mod members;

pub use announcements::announcements_router;
pub use auth::{auth_router, AuthState};
pub use meetings::meetings_router;
pub use members::members_router;

use crate::models;
use utoipa::OpenApi;

/// OpenAPI document served at `/api-docs/openapi.json` (Swagger UI at
/// `/swagger-ui`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SpeakUp API",
        description = "Club management: meetings, role sign-ups, attendance, members, announcements."
    ),
    components(schemas(
        models::auth::RequestLinkRequest,
        models::auth::RequestLinkResponse,
        models::auth::VerifyLinkResponse,
        models::auth::MeResponse,
        models::auth::MessageResponse,
        models::member::CreateMemberRequest,
        models::member::UpdateMemberRequest,
        models::member::MemberInfo,
        models::member::MemberListResponse,
        models::member::ImportReport,
        models::meeting::CreateMeetingRequest,
        models::meeting::UpdateMeetingRequest,
        models::meeting::MeetingInfo,
        models::meeting::MeetingWithRoles,
        models::meeting::RoleSlotInfo,
        models::meeting::UpcomingMeetingsResponse,
        models::meeting::ToggleRoleResponse,
        models::meeting::SaveNoteRequest,
        models::meeting::KioskResponse,
        models::meeting::KioskMemberInfo,
        models::meeting::CheckinResponse,
        models::meeting::GuestCheckinRequest,
        models::meeting::ConvertGuestResponse,
        models::meeting::BulkConvertRequest,
        models::meeting::BulkConvertResponse,
        models::meeting::SendRemindersResponse,
        models::meeting::SendFeedbackResponse,
        models::meeting::CreateRoleRequest,
        models::meeting::RoleInfo,
        models::meeting::ListRolesResponse,
        models::meeting::CreateSessionRequest,
        models::meeting::SessionInfo,
        models::meeting::ListSessionsResponse,
        models::meeting::CreateTemplateRequest,
        models::meeting::TemplateSessionSpec,
        models::meeting::TemplateRoleItemSpec,
        models::meeting::TemplateInfo,
        models::meeting::ListTemplatesResponse,
        models::announcement::Audience,
        models::announcement::CreateAnnouncementRequest,
        models::announcement::AnnouncementInfo,
        models::announcement::ListAnnouncementsResponse,
        models::announcement::SendAnnouncementResponse,
        models::version::VersionResponse,
        models::version::HelpResponse,
    ))
)]
pub struct ApiDoc;
