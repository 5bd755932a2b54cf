// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Guest-to-member conversion and attendance toggling.
//! These tests require PostgreSQL (DATABASE_URL) and are ignored by default.

use chrono::{Duration, Utc};
use speakup_agent::services::db::{CreateMeetingParams, CreateMemberParams, Db};
use speakup_agent::services::meetings::{convert_guest_attendance, toggle_member_checkin};
use uuid::Uuid;

async fn test_db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Db::connect(&url).await.expect("Failed to connect");
    db.migrate().await.expect("Failed to migrate");
    db
}

async fn create_meeting(db: &Db) -> Uuid {
    db.create_meeting(&CreateMeetingParams {
        starts_at: Utc::now() + Duration::days(1),
        theme: "",
        word_of_the_day: "",
        video_link: "",
        template_id: None,
    })
    .await
    .expect("Failed to create meeting")
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_creates_member_from_guest() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db).await;
    let email = format!("jane-{}@example.com", Uuid::now_v7());
    let attendance_id = db
        .create_guest_attendance(meeting_id, "Jane Doe", &email)
        .await
        .expect("Failed to create attendance");

    let outcome = convert_guest_attendance(&db, attendance_id)
        .await
        .expect("Conversion failed")
        .expect("Attendance should exist");

    assert!(outcome.created);
    assert!(outcome.linked);

    let member = db
        .get_member_by_email(&email)
        .await
        .expect("Failed to look up member")
        .expect("Member should exist");
    assert_eq!(member.first_name, "Jane");
    assert_eq!(member.last_name, "Doe");
    assert!(member.is_guest);

    let attendance = db
        .get_attendance(attendance_id)
        .await
        .expect("Failed to load attendance")
        .expect("Attendance should exist");
    assert_eq!(attendance.member_id, Some(member.member_id));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_links_existing_member() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db).await;
    let email = format!("jane-{}@example.com", Uuid::now_v7());

    let existing_id = db
        .create_member(&CreateMemberParams {
            email: &email,
            display_name: "Jane",
            first_name: "Jane",
            last_name: "",
            phone_number: "",
            is_guest: false,
            is_officer: false,
            join_date: None,
        })
        .await
        .expect("Failed to create member");

    // Guest email differs only in case and whitespace.
    let attendance_id = db
        .create_guest_attendance(meeting_id, "Jane Doe", &format!(" {} ", email.to_uppercase()))
        .await
        .expect("Failed to create attendance");

    let outcome = convert_guest_attendance(&db, attendance_id)
        .await
        .expect("Conversion failed")
        .expect("Attendance should exist");

    assert!(!outcome.created);
    assert!(outcome.linked);
    assert_eq!(outcome.member_id, Some(existing_id));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_conversion_is_idempotent() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db).await;
    let email = format!("jane-{}@example.com", Uuid::now_v7());
    let attendance_id = db
        .create_guest_attendance(meeting_id, "Jane Doe", &email)
        .await
        .expect("Failed to create attendance");

    let first = convert_guest_attendance(&db, attendance_id)
        .await
        .expect("Conversion failed")
        .expect("Attendance should exist");
    assert!(first.created);

    // Second run sees the linked record and does nothing.
    let second = convert_guest_attendance(&db, attendance_id)
        .await
        .expect("Conversion failed")
        .expect("Attendance should exist");
    assert!(!second.created);
    assert!(!second.linked);
    assert_eq!(second.member_id, None);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_skips_guest_without_email() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db).await;
    let attendance_id = db
        .create_guest_attendance(meeting_id, "No Email", "")
        .await
        .expect("Failed to create attendance");

    let outcome = convert_guest_attendance(&db, attendance_id)
        .await
        .expect("Conversion failed")
        .expect("Attendance should exist");

    assert!(!outcome.created);
    assert!(!outcome.linked);
    assert_eq!(outcome.member_id, None);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_checkin_toggle() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db).await;
    let email = format!("member-{}@example.com", Uuid::now_v7());
    let member_id = db
        .create_member(&CreateMemberParams {
            email: &email,
            display_name: "Member",
            first_name: "",
            last_name: "",
            phone_number: "",
            is_guest: false,
            is_officer: false,
            join_date: None,
        })
        .await
        .expect("Failed to create member");

    // First toggle checks in.
    let present = toggle_member_checkin(&db, meeting_id, member_id)
        .await
        .expect("Toggle failed");
    assert!(present);
    assert!(db
        .find_member_attendance(meeting_id, member_id)
        .await
        .expect("Lookup failed")
        .is_some());

    // Second toggle undoes it.
    let present = toggle_member_checkin(&db, meeting_id, member_id)
        .await
        .expect("Toggle failed");
    assert!(!present);
    assert!(db
        .find_member_attendance(meeting_id, member_id)
        .await
        .expect("Lookup failed")
        .is_none());
}
