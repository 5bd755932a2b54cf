// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! PostgreSQL client for club data: members, meetings, role slots,
//! attendance, and announcements. Auth tables live in
//! [`crate::services::auth_db`].

use crate::models::announcement::Announcement;
use crate::models::meeting::{
    AgendaSession, Attendance, Meeting, MeetingRole, MeetingTemplate, Role, RoleSlot,
    TemplateRoleItem, TemplateSession,
};
use crate::models::member::{Member, MemberFilter, UpdateMemberRequest};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

const MEMBER_COLUMNS: &str = "member_id, email, display_name, first_name, last_name, \
     phone_number, is_guest, is_officer, is_active, email_verified, join_date, mentor_id, \
     created_at, updated_at";

const ROLE_SLOT_SELECT: &str = "SELECT mr.meeting_role_id, mr.meeting_id, mr.role_id, \
     r.name AS role_name, r.is_speech_role, mr.member_id, \
     m.display_name AS member_display_name, m.first_name AS member_first_name, \
     m.email AS member_email, mr.notes, mr.admin_notes, mr.sort_order \
     FROM meeting_roles mr \
     JOIN roles r ON r.role_id = mr.role_id \
     LEFT JOIN members m ON m.member_id = mr.member_id";

/// Parameters for creating a member.
pub struct CreateMemberParams<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub is_guest: bool,
    pub is_officer: bool,
    pub join_date: Option<NaiveDate>,
}

/// Parameters for creating a meeting.
pub struct CreateMeetingParams<'a> {
    pub starts_at: DateTime<Utc>,
    pub theme: &'a str,
    pub word_of_the_day: &'a str,
    pub video_link: &'a str,
    pub template_id: Option<Uuid>,
}

/// One open role slot to insert when populating a meeting.
pub struct NewRoleSlot {
    pub role_id: Uuid,
    pub session_id: Option<Uuid>,
    pub sort_order: i32,
}

/// Agenda section of a concrete meeting joined with its definition.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionBlock {
    pub name: String,
    pub duration_minutes: i32,
    pub notes: String,
    pub sort_order: i32,
}

/// Club database client backed by a connection pool.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Connect to PostgreSQL and return a client.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }

    // ========== Member Operations ==========

    pub async fn get_member_by_id(&self, member_id: Uuid) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE member_id = $1",
            MEMBER_COLUMNS
        ))
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_member_by_email(&self, email: &str) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE email = $1",
            MEMBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// List members, optionally filtered by guest/officer/active flags.
    pub async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members \
             WHERE ($1::bool IS NULL OR is_guest = $1) \
               AND ($2::bool IS NULL OR is_officer = $2) \
               AND ($3::bool IS NULL OR is_active = $3) \
             ORDER BY display_name",
            MEMBER_COLUMNS
        ))
        .bind(filter.is_guest)
        .bind(filter.is_officer)
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
    }

    /// Create a member. Fails with a unique violation on duplicate email.
    pub async fn create_member(
        &self,
        params: &CreateMemberParams<'_>,
    ) -> Result<Uuid, sqlx::Error> {
        let member_id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO members \
             (member_id, email, display_name, first_name, last_name, phone_number, \
              is_guest, is_officer, is_active, email_verified, join_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, FALSE, $9, $10, $10)",
        )
        .bind(member_id)
        .bind(params.email)
        .bind(params.display_name)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.phone_number)
        .bind(params.is_guest)
        .bind(params.is_officer)
        .bind(params.join_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(member_id)
    }

    /// Apply a partial update and return the fresh row.
    pub async fn update_member(
        &self,
        member_id: Uuid,
        update: &UpdateMemberRequest,
    ) -> Result<Option<Member>, sqlx::Error> {
        let Some(current) = self.get_member_by_id(member_id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE members SET display_name = $2, first_name = $3, last_name = $4, \
             phone_number = $5, is_guest = $6, is_officer = $7, is_active = $8, \
             join_date = $9, mentor_id = $10, updated_at = $11 \
             WHERE member_id = $1",
        )
        .bind(member_id)
        .bind(
            update
                .display_name
                .as_deref()
                .unwrap_or(&current.display_name),
        )
        .bind(update.first_name.as_deref().unwrap_or(&current.first_name))
        .bind(update.last_name.as_deref().unwrap_or(&current.last_name))
        .bind(
            update
                .phone_number
                .as_deref()
                .unwrap_or(&current.phone_number),
        )
        .bind(update.is_guest.unwrap_or(current.is_guest))
        .bind(update.is_officer.unwrap_or(current.is_officer))
        .bind(update.is_active.unwrap_or(current.is_active))
        .bind(update.join_date.or(current.join_date))
        .bind(update.mentor_id.or(current.mentor_id))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_member_by_id(member_id).await
    }

    /// Insert-or-update a roster row keyed on email.
    /// Returns true when a new member row was created.
    pub async fn upsert_roster_member(
        &self,
        params: &CreateMemberParams<'_>,
    ) -> Result<bool, sqlx::Error> {
        let member_id = Uuid::now_v7();
        let now = Utc::now();

        let inserted: (bool,) = sqlx::query_as(
            "INSERT INTO members \
             (member_id, email, display_name, first_name, last_name, phone_number, \
              is_guest, is_officer, is_active, email_verified, join_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, TRUE, FALSE, $8, $9, $9) \
             ON CONFLICT (email) DO UPDATE SET \
               display_name = EXCLUDED.display_name, \
               first_name = EXCLUDED.first_name, \
               last_name = EXCLUDED.last_name, \
               phone_number = EXCLUDED.phone_number, \
               is_guest = EXCLUDED.is_guest, \
               join_date = COALESCE(EXCLUDED.join_date, members.join_date), \
               updated_at = EXCLUDED.updated_at \
             RETURNING (created_at = updated_at)",
        )
        .bind(member_id)
        .bind(params.email)
        .bind(params.display_name)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.phone_number)
        .bind(params.is_guest)
        .bind(params.join_date)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted.0)
    }

    // ========== Role / Session / Template Operations ==========

    pub async fn create_role(
        &self,
        name: &str,
        is_speech_role: bool,
        points: i32,
        time_minutes: i32,
        in_person: bool,
    ) -> Result<Uuid, sqlx::Error> {
        let role_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO roles (role_id, name, is_speech_role, points, time_minutes, in_person) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(role_id)
        .bind(name)
        .bind(is_speech_role)
        .bind(points)
        .bind(time_minutes)
        .bind(in_person)
        .execute(&self.pool)
        .await?;
        Ok(role_id)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT role_id, name, is_speech_role, points, time_minutes, in_person \
             FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_agenda_session(
        &self,
        name: &str,
        duration_minutes: i32,
        takes_roles: bool,
    ) -> Result<Uuid, sqlx::Error> {
        let session_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO agenda_sessions (session_id, name, duration_minutes, takes_roles) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session_id)
        .bind(name)
        .bind(duration_minutes)
        .bind(takes_roles)
        .execute(&self.pool)
        .await?;
        Ok(session_id)
    }

    pub async fn list_agenda_sessions(&self) -> Result<Vec<AgendaSession>, sqlx::Error> {
        sqlx::query_as::<_, AgendaSession>(
            "SELECT session_id, name, duration_minutes, takes_roles \
             FROM agenda_sessions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_agenda_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<AgendaSession>, sqlx::Error> {
        sqlx::query_as::<_, AgendaSession>(
            "SELECT session_id, name, duration_minutes, takes_roles \
             FROM agenda_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_template(&self, name: &str) -> Result<Uuid, sqlx::Error> {
        let template_id = Uuid::now_v7();
        sqlx::query("INSERT INTO meeting_templates (template_id, name) VALUES ($1, $2)")
            .bind(template_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(template_id)
    }

    pub async fn list_templates(&self) -> Result<Vec<MeetingTemplate>, sqlx::Error> {
        sqlx::query_as::<_, MeetingTemplate>(
            "SELECT template_id, name FROM meeting_templates ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn add_template_session(
        &self,
        template_id: Uuid,
        session_id: Uuid,
        sort_order: i32,
        notes: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO template_sessions \
             (template_session_id, template_id, session_id, sort_order, notes) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(template_id)
        .bind(session_id)
        .bind(sort_order)
        .bind(notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_template_role_item(
        &self,
        template_id: Uuid,
        role_id: Uuid,
        session_id: Option<Uuid>,
        slot_count: i32,
        sort_order: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO template_role_items \
             (item_id, template_id, role_id, session_id, slot_count, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(template_id)
        .bind(role_id)
        .bind(session_id)
        .bind(slot_count)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_template_sessions(
        &self,
        template_id: Uuid,
    ) -> Result<Vec<TemplateSession>, sqlx::Error> {
        sqlx::query_as::<_, TemplateSession>(
            "SELECT template_session_id, template_id, session_id, sort_order, notes \
             FROM template_sessions WHERE template_id = $1 ORDER BY sort_order",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_template_role_items(
        &self,
        template_id: Uuid,
    ) -> Result<Vec<TemplateRoleItem>, sqlx::Error> {
        sqlx::query_as::<_, TemplateRoleItem>(
            "SELECT item_id, template_id, role_id, session_id, slot_count, sort_order \
             FROM template_role_items WHERE template_id = $1 ORDER BY sort_order",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await
    }

    // ========== Meeting Operations ==========

    pub async fn create_meeting(
        &self,
        params: &CreateMeetingParams<'_>,
    ) -> Result<Uuid, sqlx::Error> {
        let meeting_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO meetings \
             (meeting_id, starts_at, theme, word_of_the_day, video_link, template_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(meeting_id)
        .bind(params.starts_at)
        .bind(params.theme)
        .bind(params.word_of_the_day)
        .bind(params.video_link)
        .bind(params.template_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(meeting_id)
    }

    pub async fn get_meeting(&self, meeting_id: Uuid) -> Result<Option<Meeting>, sqlx::Error> {
        sqlx::query_as::<_, Meeting>(
            "SELECT meeting_id, starts_at, theme, word_of_the_day, video_link, template_id, \
             created_at FROM meetings WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Update basic meeting fields, returning the fresh row.
    pub async fn update_meeting_fields(
        &self,
        meeting_id: Uuid,
        starts_at: DateTime<Utc>,
        theme: &str,
        word_of_the_day: &str,
        video_link: &str,
    ) -> Result<Option<Meeting>, sqlx::Error> {
        sqlx::query(
            "UPDATE meetings SET starts_at = $2, theme = $3, word_of_the_day = $4, \
             video_link = $5 WHERE meeting_id = $1",
        )
        .bind(meeting_id)
        .bind(starts_at)
        .bind(theme)
        .bind(word_of_the_day)
        .bind(video_link)
        .execute(&self.pool)
        .await?;
        self.get_meeting(meeting_id).await
    }

    /// Meetings starting at or after the given instant, soonest first.
    pub async fn list_upcoming_meetings(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, sqlx::Error> {
        sqlx::query_as::<_, Meeting>(
            "SELECT meeting_id, starts_at, theme, word_of_the_day, video_link, template_id, \
             created_at FROM meetings WHERE starts_at >= $1 ORDER BY starts_at",
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await
    }

    /// First meeting inside the given window, soonest first.
    pub async fn find_meeting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<Meeting>, sqlx::Error> {
        sqlx::query_as::<_, Meeting>(
            "SELECT meeting_id, starts_at, theme, word_of_the_day, video_link, template_id, \
             created_at FROM meetings WHERE starts_at >= $1 AND starts_at < $2 \
             ORDER BY starts_at LIMIT 1",
        )
        .bind(from)
        .bind(until)
        .fetch_optional(&self.pool)
        .await
    }

    // ========== Meeting Role Operations ==========

    pub async fn count_meeting_roles(&self, meeting_id: Uuid) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM meeting_roles WHERE meeting_id = $1")
                .bind(meeting_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    pub async fn insert_meeting_role(
        &self,
        meeting_id: Uuid,
        slot: &NewRoleSlot,
    ) -> Result<Uuid, sqlx::Error> {
        let meeting_role_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO meeting_roles \
             (meeting_role_id, meeting_id, role_id, session_id, sort_order) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(meeting_role_id)
        .bind(meeting_id)
        .bind(slot.role_id)
        .bind(slot.session_id)
        .bind(slot.sort_order)
        .execute(&self.pool)
        .await?;
        Ok(meeting_role_id)
    }

    pub async fn insert_meeting_session(
        &self,
        meeting_id: Uuid,
        session_id: Uuid,
        sort_order: i32,
        notes: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO meeting_sessions \
             (meeting_session_id, meeting_id, session_id, sort_order, notes) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(meeting_id)
        .bind(session_id)
        .bind(sort_order)
        .bind(notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_meeting_role(
        &self,
        meeting_role_id: Uuid,
    ) -> Result<Option<MeetingRole>, sqlx::Error> {
        sqlx::query_as::<_, MeetingRole>(
            "SELECT meeting_role_id, meeting_id, role_id, session_id, member_id, \
             backup_member_id, notes, admin_notes, sort_order \
             FROM meeting_roles WHERE meeting_role_id = $1",
        )
        .bind(meeting_role_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Role slots of a meeting joined with role and occupant data.
    pub async fn list_role_slots(&self, meeting_id: Uuid) -> Result<Vec<RoleSlot>, sqlx::Error> {
        sqlx::query_as::<_, RoleSlot>(&format!(
            "{} WHERE mr.meeting_id = $1 ORDER BY mr.sort_order",
            ROLE_SLOT_SELECT
        ))
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_role_slot(
        &self,
        meeting_role_id: Uuid,
    ) -> Result<Option<RoleSlot>, sqlx::Error> {
        sqlx::query_as::<_, RoleSlot>(&format!(
            "{} WHERE mr.meeting_role_id = $1",
            ROLE_SLOT_SELECT
        ))
        .bind(meeting_role_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Claim an open slot. Returns false when the slot was taken meanwhile.
    pub async fn claim_role(
        &self,
        meeting_role_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE meeting_roles SET member_id = $2 \
             WHERE meeting_role_id = $1 AND member_id IS NULL",
        )
        .bind(meeting_role_id)
        .bind(member_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Drop a slot held by the given member. Returns false when not held.
    pub async fn release_role(
        &self,
        meeting_role_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE meeting_roles SET member_id = NULL \
             WHERE meeting_role_id = $1 AND member_id = $2",
        )
        .bind(meeting_role_id)
        .bind(member_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn set_role_notes(
        &self,
        meeting_role_id: Uuid,
        notes: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE meeting_roles SET notes = $2 WHERE meeting_role_id = $1")
            .bind(meeting_role_id)
            .bind(notes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_role_admin_notes(
        &self,
        meeting_role_id: Uuid,
        admin_notes: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE meeting_roles SET admin_notes = $2 WHERE meeting_role_id = $1")
            .bind(meeting_role_id)
            .bind(admin_notes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Agenda sections of a meeting with their definitions, in program order.
    pub async fn list_session_blocks(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<SessionBlock>, sqlx::Error> {
        sqlx::query_as::<_, SessionBlock>(
            "SELECT s.name, s.duration_minutes, ms.notes, ms.sort_order \
             FROM meeting_sessions ms \
             JOIN agenda_sessions s ON s.session_id = ms.session_id \
             WHERE ms.meeting_id = $1 ORDER BY ms.sort_order",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
    }

    // ========== Attendance Operations ==========

    pub async fn get_attendance(
        &self,
        attendance_id: Uuid,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            "SELECT attendance_id, meeting_id, member_id, guest_name, guest_email, recorded_at \
             FROM attendance WHERE attendance_id = $1",
        )
        .bind(attendance_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_member_attendance(
        &self,
        meeting_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            "SELECT attendance_id, meeting_id, member_id, guest_name, guest_email, recorded_at \
             FROM attendance WHERE meeting_id = $1 AND member_id = $2",
        )
        .bind(meeting_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_member_attendance(
        &self,
        meeting_id: Uuid,
        member_id: Uuid,
    ) -> Result<Uuid, sqlx::Error> {
        let attendance_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO attendance (attendance_id, meeting_id, member_id, recorded_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(attendance_id)
        .bind(meeting_id)
        .bind(member_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(attendance_id)
    }

    pub async fn create_guest_attendance(
        &self,
        meeting_id: Uuid,
        guest_name: &str,
        guest_email: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let attendance_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO attendance \
             (attendance_id, meeting_id, guest_name, guest_email, recorded_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(attendance_id)
        .bind(meeting_id)
        .bind(guest_name)
        .bind(guest_email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(attendance_id)
    }

    pub async fn delete_attendance(&self, attendance_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM attendance WHERE attendance_id = $1")
            .bind(attendance_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn link_attendance_member(
        &self,
        attendance_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE attendance SET member_id = $2 WHERE attendance_id = $1")
            .bind(attendance_id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_attendance(&self, meeting_id: Uuid) -> Result<Vec<Attendance>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            "SELECT attendance_id, meeting_id, member_id, guest_name, guest_email, recorded_at \
             FROM attendance WHERE meeting_id = $1 ORDER BY recorded_at",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
    }

    /// IDs of members already checked in to a meeting.
    pub async fn checked_in_member_ids(&self, meeting_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT member_id FROM attendance \
             WHERE meeting_id = $1 AND member_id IS NOT NULL",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ========== Announcement Operations ==========

    pub async fn create_announcement(
        &self,
        subject: &str,
        body: &str,
        audience: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let announcement_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO announcements (announcement_id, subject, body, audience, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(announcement_id)
        .bind(subject)
        .bind(body)
        .bind(audience)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(announcement_id)
    }

    pub async fn get_announcement(
        &self,
        announcement_id: Uuid,
    ) -> Result<Option<Announcement>, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            "SELECT announcement_id, subject, body, audience, created_at, sent_at \
             FROM announcements WHERE announcement_id = $1",
        )
        .bind(announcement_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        sqlx::query_as::<_, Announcement>(
            "SELECT announcement_id, subject, body, audience, created_at, sent_at \
             FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn mark_announcement_sent(
        &self,
        announcement_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE announcements SET sent_at = $2 WHERE announcement_id = $1")
            .bind(announcement_id)
            .bind(sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
