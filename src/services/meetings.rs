// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Meeting domain logic: populating role slots from a template, role
//! claim/drop, attendance toggling, guest-to-member conversion, and the
//! reminder/feedback mailers.

use crate::models::meeting::{Attendance, Meeting, RoleSlot, TemplateRoleItem};
use crate::models::member::Member;
use crate::services::db::{CreateMemberParams, Db, NewRoleSlot};
use crate::services::email::{EmailTemplate, OutboundEmail};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const ROLE_REMINDER_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/role_reminder.txt"));
const OPEN_ROLES_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/open_roles.txt"));
const ROLE_FEEDBACK_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/role_feedback.txt"));
const GUEST_THANK_YOU_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/guest_thank_you.txt"));

// ============================================================================
// Template population
// ============================================================================

/// Expand template role items into concrete open slots.
/// An item with `slot_count = 3` yields three slots; `sort_order` is a running
/// index so duplicate roles stay distinct.
pub fn expand_template_items(items: &[TemplateRoleItem]) -> Vec<NewRoleSlot> {
    let mut slots = Vec::new();
    for item in items {
        for _ in 0..item.slot_count.max(0) {
            slots.push(NewRoleSlot {
                role_id: item.role_id,
                session_id: item.session_id,
                sort_order: slots.len() as i32,
            });
        }
    }
    slots
}

/// Populate a freshly created meeting from its template: copy the agenda
/// sessions and create one open role slot per template item count.
///
/// Runs only when the meeting has no role slots yet, so re-saving meeting
/// fields never duplicates roles. Returns the number of slots created.
pub async fn populate_from_template(
    db: &Db,
    meeting_id: Uuid,
    template_id: Uuid,
) -> Result<usize> {
    let existing = db
        .count_meeting_roles(meeting_id)
        .await
        .context("Failed to count meeting roles")?;
    if existing > 0 {
        return Ok(0);
    }

    let sessions = db
        .list_template_sessions(template_id)
        .await
        .context("Failed to load template sessions")?;
    for session in &sessions {
        db.insert_meeting_session(
            meeting_id,
            session.session_id,
            session.sort_order,
            &session.notes,
        )
        .await
        .context("Failed to copy template session")?;
    }

    let items = db
        .list_template_role_items(template_id)
        .await
        .context("Failed to load template role items")?;
    let slots = expand_template_items(&items);
    for slot in &slots {
        db.insert_meeting_role(meeting_id, slot)
            .await
            .context("Failed to create role slot")?;
    }

    Ok(slots.len())
}

// ============================================================================
// Role claim / drop
// ============================================================================

/// Result of a toggle request against one role slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The caller now holds the slot.
    Claimed,
    /// The caller released the slot.
    Dropped,
    /// Someone else holds the slot; nothing changed.
    Conflict,
    NotFound,
}

/// Claim an open slot, or drop it when the caller already holds it.
pub async fn toggle_role(
    db: &Db,
    meeting_role_id: Uuid,
    member_id: Uuid,
) -> Result<ToggleOutcome> {
    let Some(slot) = db
        .get_meeting_role(meeting_role_id)
        .await
        .context("Failed to load role slot")?
    else {
        return Ok(ToggleOutcome::NotFound);
    };

    match slot.member_id {
        // Already mine: clicking again drops it.
        Some(current) if current == member_id => {
            db.release_role(meeting_role_id, member_id)
                .await
                .context("Failed to release role")?;
            Ok(ToggleOutcome::Dropped)
        }
        // Someone else holds it.
        Some(_) => Ok(ToggleOutcome::Conflict),
        // Open: claim it. The guarded UPDATE loses gracefully if another
        // member claimed the slot between the read and the write.
        None => {
            if db
                .claim_role(meeting_role_id, member_id)
                .await
                .context("Failed to claim role")?
            {
                Ok(ToggleOutcome::Claimed)
            } else {
                Ok(ToggleOutcome::Conflict)
            }
        }
    }
}

// ============================================================================
// Attendance
// ============================================================================

/// Toggle a member check-in. Returns whether the member is present after.
pub async fn toggle_member_checkin(
    db: &Db,
    meeting_id: Uuid,
    member_id: Uuid,
) -> Result<bool> {
    match db
        .find_member_attendance(meeting_id, member_id)
        .await
        .context("Failed to look up attendance")?
    {
        Some(attendance) => {
            // Clicked again: undo the check-in.
            db.delete_attendance(attendance.attendance_id)
                .await
                .context("Failed to remove check-in")?;
            Ok(false)
        }
        None => {
            db.create_member_attendance(meeting_id, member_id)
                .await
                .context("Failed to create check-in")?;
            Ok(true)
        }
    }
}

// ============================================================================
// Guest conversion
// ============================================================================

/// Outcome of converting a guest attendance record to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub member_id: Option<Uuid>,
    /// A new member row was created.
    pub created: bool,
    /// The attendance record was linked to a member.
    pub linked: bool,
}

impl ConversionOutcome {
    fn skipped() -> Self {
        ConversionOutcome {
            member_id: None,
            created: false,
            linked: false,
        }
    }
}

/// Split a free-form guest name into (first, last) on the first whitespace.
pub fn split_guest_name(name: &str) -> (String, String) {
    let trimmed = name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Convert a guest attendance record to a linked member account.
///
/// Idempotent: records that are already linked or carry no guest email are
/// skipped; an existing member with the same email is linked instead of
/// creating a duplicate. Returns `None` when the attendance record is gone.
pub async fn convert_guest_attendance(
    db: &Db,
    attendance_id: Uuid,
) -> Result<Option<ConversionOutcome>> {
    let Some(attendance) = db
        .get_attendance(attendance_id)
        .await
        .context("Failed to load attendance")?
    else {
        return Ok(None);
    };

    if attendance.member_id.is_some() || attendance.guest_email.trim().is_empty() {
        return Ok(Some(ConversionOutcome::skipped()));
    }

    let email = normalize_email(&attendance.guest_email);

    if let Some(existing) = db
        .get_member_by_email(&email)
        .await
        .context("Failed to look up member by email")?
    {
        db.link_attendance_member(attendance_id, existing.member_id)
            .await
            .context("Failed to link attendance")?;
        return Ok(Some(ConversionOutcome {
            member_id: Some(existing.member_id),
            created: false,
            linked: true,
        }));
    }

    let (first_name, last_name) = split_guest_name(&attendance.guest_name);
    let display_name = if attendance.guest_name.trim().is_empty() {
        email.split('@').next().unwrap_or(&email).to_string()
    } else {
        attendance.guest_name.trim().to_string()
    };

    let member_id = db
        .create_member(&CreateMemberParams {
            email: &email,
            display_name: &display_name,
            first_name: &first_name,
            last_name: &last_name,
            phone_number: "",
            is_guest: true,
            is_officer: false,
            join_date: None,
        })
        .await
        .context("Failed to create member from guest")?;

    db.link_attendance_member(attendance_id, member_id)
        .await
        .context("Failed to link attendance")?;

    Ok(Some(ConversionOutcome {
        member_id: Some(member_id),
        created: true,
        linked: true,
    }))
}

// ============================================================================
// Reminder and feedback mail
// ============================================================================

fn meeting_day(starts_at: DateTime<Utc>) -> String {
    starts_at.format("%A, %B %d").to_string()
}

fn arrival_time(starts_at: DateTime<Utc>) -> String {
    starts_at.format("%I:%M %p").to_string()
}

fn meeting_date(starts_at: DateTime<Utc>) -> String {
    starts_at.format("%Y-%m-%d").to_string()
}

fn first_name_of(slot: &RoleSlot) -> String {
    match slot.member_first_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => slot.member_display_name.clone().unwrap_or_default(),
    }
}

/// Build reminder emails for one meeting:
/// 1. every assigned occupant gets a "don't forget your role" note;
/// 2. when open slots remain, every candidate member not already assigned
///    gets the open-role list.
///
/// `candidates` should be the active, non-guest members; filtering against
/// the assigned set happens here.
pub fn build_reminder_emails(
    meeting: &Meeting,
    slots: &[RoleSlot],
    candidates: &[Member],
    app_base_url: &str,
) -> Vec<OutboundEmail> {
    let agenda_link = format!("{}/meetings/upcoming", app_base_url);
    let day = meeting_day(meeting.starts_at);
    let mut messages = Vec::new();

    // 1. Remind assigned people
    for slot in slots.iter().filter(|s| !s.is_open()) {
        let Some(email) = slot.member_email.as_deref().filter(|e| !e.is_empty()) else {
            continue;
        };
        let body = ROLE_REMINDER_TEMPLATE.render(&[
            ("first_name", &first_name_of(slot)),
            ("role_name", &slot.role_name),
            ("meeting_day", &day),
            ("arrival_time", &arrival_time(meeting.starts_at)),
            ("theme", &meeting.theme),
            ("agenda_link", &agenda_link),
        ]);
        messages.push(OutboundEmail {
            to: email.to_string(),
            subject: format!(
                "Reminder: You are {} on {}",
                slot.role_name,
                meeting_date(meeting.starts_at)
            ),
            body,
        });
    }

    // 2. Beg for help (open roles)
    let open: Vec<&RoleSlot> = slots.iter().filter(|s| s.is_open()).collect();
    if !open.is_empty() {
        let assigned_ids: Vec<Uuid> = slots.iter().filter_map(|s| s.member_id).collect();
        let role_list = open
            .iter()
            .map(|s| format!("- {}", s.role_name))
            .collect::<Vec<_>>()
            .join("\n");

        for member in candidates
            .iter()
            .filter(|m| !assigned_ids.contains(&m.member_id) && !m.email.is_empty())
        {
            let first_name = if member.first_name.is_empty() {
                &member.display_name
            } else {
                &member.first_name
            };
            let body = OPEN_ROLES_TEMPLATE.render(&[
                ("first_name", first_name),
                ("meeting_day", &day),
                ("role_list", &role_list),
                ("agenda_link", &agenda_link),
            ]);
            messages.push(OutboundEmail {
                to: member.email.clone(),
                subject: format!("Roles needed for {}", meeting_date(meeting.starts_at)),
                body,
            });
        }
    }

    messages
}

/// Build feedback emails for occupants whose slot carries officer notes.
pub fn build_feedback_emails(meeting: &Meeting, slots: &[RoleSlot]) -> Vec<OutboundEmail> {
    slots
        .iter()
        .filter(|s| !s.is_open() && !s.admin_notes.is_empty())
        .filter_map(|slot| {
            let email = slot.member_email.as_deref().filter(|e| !e.is_empty())?;
            let body = ROLE_FEEDBACK_TEMPLATE.render(&[
                ("first_name", &first_name_of(slot)),
                ("role_name", &slot.role_name),
                ("meeting_date", &meeting_date(meeting.starts_at)),
                ("admin_notes", &slot.admin_notes),
            ]);
            Some(OutboundEmail {
                to: email.to_string(),
                subject: format!("Feedback: Your role as {}", slot.role_name),
                body,
            })
        })
        .collect()
}

/// Build thank-you emails for walk-in guests who left an email address.
pub fn build_guest_thank_yous(meeting: &Meeting, attendance: &[Attendance]) -> Vec<OutboundEmail> {
    attendance
        .iter()
        .filter(|a| !a.guest_email.trim().is_empty())
        .map(|a| {
            let name = if a.guest_name.trim().is_empty() {
                "there"
            } else {
                a.guest_name.trim()
            };
            let body = GUEST_THANK_YOU_TEMPLATE.render(&[
                ("guest_name", name),
                ("meeting_date", &meeting_date(meeting.starts_at)),
            ]);
            OutboundEmail {
                to: a.guest_email.trim().to_string(),
                subject: format!(
                    "Thanks for visiting SpeakUp on {}",
                    meeting_date(meeting.starts_at)
                ),
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(role_id: Uuid, slot_count: i32, sort_order: i32) -> TemplateRoleItem {
        TemplateRoleItem {
            item_id: Uuid::now_v7(),
            template_id: Uuid::now_v7(),
            role_id,
            session_id: None,
            slot_count,
            sort_order,
        }
    }

    fn meeting(theme: &str) -> Meeting {
        Meeting {
            meeting_id: Uuid::now_v7(),
            starts_at: Utc::now(),
            theme: theme.to_string(),
            word_of_the_day: String::new(),
            video_link: String::new(),
            template_id: None,
            created_at: Utc::now(),
        }
    }

    fn slot(role_name: &str, occupant: Option<(&str, &str)>) -> RoleSlot {
        RoleSlot {
            meeting_role_id: Uuid::now_v7(),
            meeting_id: Uuid::now_v7(),
            role_id: Uuid::now_v7(),
            role_name: role_name.to_string(),
            is_speech_role: false,
            member_id: occupant.map(|_| Uuid::now_v7()),
            member_display_name: occupant.map(|(name, _)| name.to_string()),
            member_first_name: occupant.map(|(name, _)| name.to_string()),
            member_email: occupant.map(|(_, email)| email.to_string()),
            notes: String::new(),
            admin_notes: String::new(),
            sort_order: 0,
        }
    }

    fn candidate(name: &str, email: &str) -> Member {
        Member {
            member_id: Uuid::now_v7(),
            email: email.to_string(),
            display_name: name.to_string(),
            first_name: name.to_string(),
            last_name: String::new(),
            phone_number: String::new(),
            is_guest: false,
            is_officer: false,
            is_active: true,
            email_verified: true,
            join_date: None,
            mentor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expand_template_items_counts() {
        let speaker = Uuid::now_v7();
        let timer = Uuid::now_v7();
        let slots = expand_template_items(&[item(speaker, 3, 1), item(timer, 1, 2)]);

        assert_eq!(slots.len(), 4);
        assert_eq!(slots.iter().filter(|s| s.role_id == speaker).count(), 3);
        assert_eq!(slots.iter().filter(|s| s.role_id == timer).count(), 1);
    }

    #[test]
    fn test_expand_template_items_unique_sort_order() {
        let role = Uuid::now_v7();
        let slots = expand_template_items(&[item(role, 3, 1)]);
        let orders: Vec<i32> = slots.iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_expand_template_items_empty() {
        assert!(expand_template_items(&[]).is_empty());
    }

    #[test]
    fn test_split_guest_name() {
        assert_eq!(
            split_guest_name("Jane Doe"),
            ("Jane".to_string(), "Doe".to_string())
        );
        assert_eq!(
            split_guest_name("  Jane   van Dyke "),
            ("Jane".to_string(), "van Dyke".to_string())
        );
        assert_eq!(split_guest_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(split_guest_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_reminders_for_assigned_only() {
        let m = meeting("Leadership");
        let slots = vec![slot("Speaker", Some(("Alice", "alice@example.com")))];
        let messages = build_reminder_emails(&m, &slots, &[], "http://localhost");

        assert_eq!(messages.len(), 1);
        assert!(messages[0].subject.contains("Speaker"));
        assert_eq!(messages[0].to, "alice@example.com");
        assert!(messages[0].body.contains("Leadership"));
    }

    #[test]
    fn test_open_roles_plea_excludes_assigned_members() {
        let m = meeting("");
        let mut taken = slot("Toastmaster", Some(("Alice", "alice@example.com")));
        let open = slot("Timer", None);

        // Alice is both an occupant and a candidate; she must not be begged.
        let mut alice = candidate("Alice", "alice@example.com");
        alice.member_id = taken.member_id.unwrap();
        taken.member_id = Some(alice.member_id);
        let bob = candidate("Bob", "bob@example.com");

        let messages = build_reminder_emails(
            &m,
            &[taken, open],
            &[alice, bob],
            "http://localhost",
        );

        // One reminder for Alice, one plea for Bob.
        assert_eq!(messages.len(), 2);
        let pleas: Vec<_> = messages
            .iter()
            .filter(|msg| msg.subject.starts_with("Roles needed"))
            .collect();
        assert_eq!(pleas.len(), 1);
        assert_eq!(pleas[0].to, "bob@example.com");
        assert!(pleas[0].body.contains("- Timer"));
    }

    #[test]
    fn test_no_plea_when_fully_staffed() {
        let m = meeting("");
        let slots = vec![slot("Timer", Some(("Alice", "alice@example.com")))];
        let bob = candidate("Bob", "bob@example.com");

        let messages = build_reminder_emails(&m, &slots, &[bob], "http://localhost");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].subject.starts_with("Reminder"));
    }

    #[test]
    fn test_feedback_requires_admin_notes() {
        let m = meeting("");
        let mut with_notes = slot("Speaker", Some(("Alice", "alice@example.com")));
        with_notes.admin_notes = "Great job!".to_string();
        let without_notes = slot("Timer", Some(("Bob", "bob@example.com")));

        let messages = build_feedback_emails(&m, &[with_notes, without_notes]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, "alice@example.com");
        assert!(messages[0].body.contains("Great job!"));
    }

    #[test]
    fn test_guest_thank_yous_skip_missing_email() {
        let m = meeting("");
        let with_email = Attendance {
            attendance_id: Uuid::now_v7(),
            meeting_id: m.meeting_id,
            member_id: None,
            guest_name: "Jane Doe".to_string(),
            guest_email: "jane@example.com".to_string(),
            recorded_at: Utc::now(),
        };
        let without_email = Attendance {
            attendance_id: Uuid::now_v7(),
            guest_name: "No Email".to_string(),
            guest_email: String::new(),
            ..with_email.clone()
        };

        let messages = build_guest_thank_yous(&m, &[with_email, without_email]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, "jane@example.com");
        assert!(messages[0].body.contains("Jane Doe"));
    }
}
