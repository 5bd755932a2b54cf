// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Template-to-meeting role population.
//! These tests require PostgreSQL (DATABASE_URL) and are ignored by default.

use chrono::{Duration, Utc};
use speakup_agent::services::db::{CreateMeetingParams, Db};
use speakup_agent::services::meetings::populate_from_template;
use uuid::Uuid;

async fn test_db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Db::connect(&url).await.expect("Failed to connect");
    db.migrate().await.expect("Failed to migrate");
    db
}

struct Fixture {
    speaker_role: Uuid,
    timer_role: Uuid,
    template_id: Uuid,
}

/// A "Regular" template: three Speakers and one Timer.
async fn create_fixture(db: &Db) -> Fixture {
    let speaker_role = db
        .create_role("Speaker", true, 3, 7, true)
        .await
        .expect("Failed to create role");
    let timer_role = db
        .create_role("Timer", false, 1, 3, true)
        .await
        .expect("Failed to create role");

    let template_id = db
        .create_template(&format!("Regular {}", Uuid::now_v7()))
        .await
        .expect("Failed to create template");
    db.add_template_role_item(template_id, speaker_role, None, 3, 1)
        .await
        .expect("Failed to add item");
    db.add_template_role_item(template_id, timer_role, None, 1, 2)
        .await
        .expect("Failed to add item");

    Fixture {
        speaker_role,
        timer_role,
        template_id,
    }
}

async fn create_meeting(db: &Db, template_id: Option<Uuid>) -> Uuid {
    db.create_meeting(&CreateMeetingParams {
        starts_at: Utc::now() + Duration::days(7),
        theme: "",
        word_of_the_day: "",
        video_link: "",
        template_id,
    })
    .await
    .expect("Failed to create meeting")
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_roles_populated_on_create() {
    let db = test_db().await;
    let fixture = create_fixture(&db).await;
    let meeting_id = create_meeting(&db, Some(fixture.template_id)).await;

    let created = populate_from_template(&db, meeting_id, fixture.template_id)
        .await
        .expect("Failed to populate");
    assert_eq!(created, 4);

    let slots = db.list_role_slots(meeting_id).await.expect("Failed to list");
    assert_eq!(slots.len(), 4);
    assert_eq!(
        slots
            .iter()
            .filter(|s| s.role_id == fixture.speaker_role)
            .count(),
        3
    );
    assert_eq!(
        slots
            .iter()
            .filter(|s| s.role_id == fixture.timer_role)
            .count(),
        1
    );
    // Every slot starts open.
    assert!(slots.iter().all(|s| s.is_open()));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_no_roles_without_template() {
    let db = test_db().await;
    let meeting_id = create_meeting(&db, None).await;

    let count = db
        .count_meeting_roles(meeting_id)
        .await
        .expect("Failed to count");
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_roles_not_duplicated_on_repopulate() {
    let db = test_db().await;
    let fixture = create_fixture(&db).await;
    let meeting_id = create_meeting(&db, Some(fixture.template_id)).await;

    populate_from_template(&db, meeting_id, fixture.template_id)
        .await
        .expect("Failed to populate");

    // A second save of the meeting must not create more slots.
    let created_again = populate_from_template(&db, meeting_id, fixture.template_id)
        .await
        .expect("Failed to repopulate");
    assert_eq!(created_again, 0);

    let count = db
        .count_meeting_roles(meeting_id)
        .await
        .expect("Failed to count");
    assert_eq!(count, 4);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_template_sessions_copied() {
    let db = test_db().await;
    let fixture = create_fixture(&db).await;
    let session_id = db
        .create_agenda_session("Prepared Speeches", 30, true)
        .await
        .expect("Failed to create session");
    db.add_template_session(fixture.template_id, session_id, 1, "Main block")
        .await
        .expect("Failed to add template session");

    let meeting_id = create_meeting(&db, Some(fixture.template_id)).await;
    populate_from_template(&db, meeting_id, fixture.template_id)
        .await
        .expect("Failed to populate");

    let blocks = db
        .list_session_blocks(meeting_id)
        .await
        .expect("Failed to list blocks");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name, "Prepared Speeches");
    assert_eq!(blocks[0].notes, "Main block");
}
