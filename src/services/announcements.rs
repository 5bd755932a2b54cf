// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Bulk announcement email to an audience-filtered set of members.

use crate::models::announcement::{Announcement, Audience};
use crate::models::member::{Member, MemberFilter};
use crate::services::db::Db;
use crate::services::email::{EmailService, OutboundEmail};
use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

/// Select the recipients for an audience out of the full member list.
/// Only active members with an email address are eligible.
pub fn audience_recipients(audience: Audience, members: &[Member]) -> Vec<&Member> {
    members
        .iter()
        .filter(|m| m.is_active && !m.email.is_empty())
        .filter(|m| match audience {
            Audience::All => true,
            Audience::Officers => m.is_officer,
            Audience::Guests => m.is_guest,
        })
        .collect()
}

/// Build one message per recipient; subject and body come straight from the
/// announcement.
pub fn build_announcement_emails(
    announcement: &Announcement,
    recipients: &[&Member],
) -> Vec<OutboundEmail> {
    recipients
        .iter()
        .map(|member| OutboundEmail {
            to: member.email.clone(),
            subject: announcement.subject.clone(),
            body: announcement.body.clone(),
        })
        .collect()
}

/// Send an announcement to its audience and stamp `sent_at`.
/// Returns `None` when the announcement does not exist, otherwise the
/// recipient count. Send failures are logged and re-raised.
pub async fn send_announcement(
    db: &Db,
    email: &EmailService,
    announcement_id: Uuid,
) -> Result<Option<usize>> {
    let Some(announcement) = db
        .get_announcement(announcement_id)
        .await
        .context("Failed to load announcement")?
    else {
        return Ok(None);
    };

    let members = db
        .list_members(&MemberFilter::default())
        .await
        .context("Failed to load members")?;

    let recipients = audience_recipients(announcement.audience(), &members);
    let messages = build_announcement_emails(&announcement, &recipients);

    let count = match email.send_batch(&messages).await {
        Ok(count) => count,
        Err(e) => {
            eprintln!(
                "[MAIL] Failed to send announcement '{}': {:#}",
                announcement.subject, e
            );
            return Err(e);
        }
    };

    db.mark_announcement_sent(announcement_id, Utc::now())
        .await
        .context("Failed to stamp sent_at")?;

    Ok(Some(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(email: &str, is_officer: bool, is_guest: bool, is_active: bool) -> Member {
        Member {
            member_id: Uuid::now_v7(),
            email: email.to_string(),
            display_name: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            is_guest,
            is_officer,
            is_active,
            email_verified: true,
            join_date: None,
            mentor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn club() -> Vec<Member> {
        vec![
            member("member@example.com", false, false, true),
            member("officer@example.com", true, false, true),
            member("guest@example.com", false, true, true),
        ]
    }

    #[test]
    fn test_send_to_all() {
        let members = club();
        let recipients = audience_recipients(Audience::All, &members);
        assert_eq!(recipients.len(), 3);
    }

    #[test]
    fn test_send_to_officers() {
        let members = club();
        let recipients = audience_recipients(Audience::Officers, &members);
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "officer@example.com");
    }

    #[test]
    fn test_send_to_guests() {
        let members = club();
        let recipients = audience_recipients(Audience::Guests, &members);
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "guest@example.com");
    }

    #[test]
    fn test_inactive_and_emailless_members_excluded() {
        let mut members = club();
        members.push(member("inactive@example.com", false, false, false));
        members.push(member("", false, false, true));

        let recipients = audience_recipients(Audience::All, &members);
        assert_eq!(recipients.len(), 3);
    }

    #[test]
    fn test_announcement_messages_carry_subject_and_body() {
        let members = club();
        let recipients = audience_recipients(Audience::Officers, &members);
        let announcement = Announcement {
            announcement_id: Uuid::now_v7(),
            subject: "Officers only".to_string(),
            body: "Test".to_string(),
            audience: "officers".to_string(),
            created_at: Utc::now(),
            sent_at: None,
        };

        let messages = build_announcement_emails(&announcement, &recipients);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, "officer@example.com");
        assert_eq!(messages[0].subject, "Officers only");
        assert_eq!(messages[0].body, "Test");
    }
}
