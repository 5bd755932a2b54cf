// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Printable agenda documents, produced by substituting meeting data into a
//! bundled plain-text template.

use crate::models::meeting::{Meeting, RoleSlot};
use crate::services::db::SessionBlock;
use crate::services::email::EmailTemplate;

const AGENDA_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/agenda.txt"));

fn session_lines(sessions: &[SessionBlock]) -> String {
    if sessions.is_empty() {
        return "(no program sections)".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            let mut line = format!("{} ({} min)", s.name, s.duration_minutes);
            if !s.notes.is_empty() {
                line.push_str(&format!("\n    {}", s.notes));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assignment_lines(slots: &[RoleSlot]) -> String {
    if slots.is_empty() {
        return "(no roles scheduled)".to_string();
    }
    slots
        .iter()
        .map(|s| {
            let occupant = s.member_display_name.as_deref().unwrap_or("OPEN");
            format!("{:<24} {}", s.role_name, occupant)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the printable agenda for a meeting.
pub fn render_agenda(meeting: &Meeting, sessions: &[SessionBlock], slots: &[RoleSlot]) -> String {
    AGENDA_TEMPLATE.render(&[
        ("date", &meeting.starts_at.format("%A, %B %d, %Y").to_string()),
        ("theme", &meeting.theme),
        ("word_of_the_day", &meeting.word_of_the_day),
        ("sessions", &session_lines(sessions)),
        ("assignments", &assignment_lines(slots)),
    ])
}

/// Attachment filename for a meeting's agenda.
pub fn agenda_filename(meeting: &Meeting) -> String {
    format!("agenda-{}.txt", meeting.starts_at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn meeting() -> Meeting {
        Meeting {
            meeting_id: Uuid::now_v7(),
            starts_at: Utc.with_ymd_and_hms(2026, 3, 9, 19, 0, 0).unwrap(),
            theme: "Leadership".to_string(),
            word_of_the_day: "Serendipity".to_string(),
            video_link: String::new(),
            template_id: None,
            created_at: Utc::now(),
        }
    }

    fn slot(role_name: &str, occupant: Option<&str>) -> RoleSlot {
        RoleSlot {
            meeting_role_id: Uuid::now_v7(),
            meeting_id: Uuid::now_v7(),
            role_id: Uuid::now_v7(),
            role_name: role_name.to_string(),
            is_speech_role: false,
            member_id: occupant.map(|_| Uuid::now_v7()),
            member_display_name: occupant.map(|n| n.to_string()),
            member_first_name: None,
            member_email: None,
            notes: String::new(),
            admin_notes: String::new(),
            sort_order: 0,
        }
    }

    #[test]
    fn test_agenda_substitutes_placeholders() {
        let sessions = vec![SessionBlock {
            name: "Prepared Speeches".to_string(),
            duration_minutes: 30,
            notes: String::new(),
            sort_order: 0,
        }];
        let slots = vec![
            slot("Toastmaster", Some("Alice")),
            slot("Timer", None),
        ];

        let agenda = render_agenda(&meeting(), &sessions, &slots);

        assert!(agenda.contains("Monday, March 09, 2026"));
        assert!(agenda.contains("Leadership"));
        assert!(agenda.contains("Serendipity"));
        assert!(agenda.contains("Prepared Speeches (30 min)"));
        assert!(agenda.contains("Alice"));
        assert!(agenda.contains("OPEN"));
        assert!(!agenda.contains("{{"));
    }

    #[test]
    fn test_agenda_empty_meeting() {
        let agenda = render_agenda(&meeting(), &[], &[]);
        assert!(agenda.contains("(no program sections)"));
        assert!(agenda.contains("(no roles scheduled)"));
    }

    #[test]
    fn test_agenda_filename() {
        assert_eq!(agenda_filename(&meeting()), "agenda-2026-03-09.txt");
    }
}
