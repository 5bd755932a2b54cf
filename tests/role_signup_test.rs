// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Role sign-up flow driven through the HTTP router: claim, drop, conflict.
//! These tests require PostgreSQL (DATABASE_URL) and are ignored by default.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use speakup_agent::app::{create_router, AppState};
use speakup_agent::routes::AuthState;
use speakup_agent::services::auth::{AuthConfig, AuthService};
use speakup_agent::services::auth_db::{AuthDbClient, CreateSessionParams};
use speakup_agent::services::db::{CreateMeetingParams, CreateMemberParams, Db, NewRoleSlot};
use speakup_agent::services::email::{EmailConfig, EmailService};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

async fn test_db() -> Db {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Db::connect(&url).await.expect("Failed to connect");
    db.migrate().await.expect("Failed to migrate");
    db
}

fn test_email_service() -> Arc<EmailService> {
    // Transport is lazy, so no SMTP server is needed unless a test sends mail.
    let config = EmailConfig {
        smtp_host: "localhost".to_string(),
        smtp_port: 2525,
        smtp_username: "test".to_string(),
        smtp_password: "test".to_string(),
        smtp_tls: false,
        from_email: "noreply@example.com".to_string(),
        from_name: "SpeakUp".to_string(),
        app_base_url: "http://localhost:3000".to_string(),
        magic_link_expiry_minutes: 15,
    };
    Arc::new(EmailService::new(config).expect("Failed to build email service"))
}

fn test_app(db: Db) -> Router {
    let auth_db = AuthDbClient::new(db.pool().clone());
    let auth_state = AuthState::new(
        auth_db,
        test_email_service(),
        AuthConfig {
            session_max_age_days: 1,
            magic_link_expiry_minutes: 15,
        },
    );
    create_router(AppState {
        db,
        email: test_email_service(),
        auth_state,
    })
}

/// Insert a session row directly and return the raw cookie value.
async fn sign_in(db: &Db, member_id: Uuid) -> String {
    let (raw_token, session_hash) = AuthService::generate_token();
    AuthDbClient::new(db.pool().clone())
        .create_session(&CreateSessionParams {
            session_id_hash: &session_hash,
            member_id,
            expires_at: Utc::now() + Duration::days(1),
            user_agent: None,
            ip_address: None,
        })
        .await
        .expect("Failed to create session");
    raw_token
}

async fn create_test_member(db: &Db, is_officer: bool) -> Uuid {
    let email = format!("test-{}@example.com", Uuid::now_v7());
    db.create_member(&CreateMemberParams {
        email: &email,
        display_name: "Test Member",
        first_name: "Test",
        last_name: "Member",
        phone_number: "",
        is_guest: false,
        is_officer,
        join_date: None,
    })
    .await
    .expect("Failed to create member")
}

async fn create_test_slot(db: &Db) -> Uuid {
    let meeting_id = db
        .create_meeting(&CreateMeetingParams {
            starts_at: Utc::now() + Duration::days(7),
            theme: "Testing",
            word_of_the_day: "",
            video_link: "",
            template_id: None,
        })
        .await
        .expect("Failed to create meeting");
    let role_id = db
        .create_role("Timer", false, 1, 3, true)
        .await
        .expect("Failed to create role");
    db.insert_meeting_role(
        meeting_id,
        &NewRoleSlot {
            role_id,
            session_id: None,
            sort_order: 0,
        },
    )
    .await
    .expect("Failed to create slot")
}

fn toggle_request(meeting_role_id: Uuid, session: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/meetings/roles/{}/toggle", meeting_role_id))
        .header(header::COOKIE, format!("speakup_session={}", session))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_claim_role() {
    let db = test_db().await;
    let member_id = create_test_member(&db, false).await;
    let slot_id = create_test_slot(&db).await;
    let session = sign_in(&db, member_id).await;
    let app = test_app(db.clone());

    let response = app
        .oneshot(toggle_request(slot_id, &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let slot = db
        .get_meeting_role(slot_id)
        .await
        .expect("Failed to load slot")
        .expect("Slot should exist");
    assert_eq!(slot.member_id, Some(member_id));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_drop_role() {
    let db = test_db().await;
    let member_id = create_test_member(&db, false).await;
    let slot_id = create_test_slot(&db).await;
    assert!(db.claim_role(slot_id, member_id).await.unwrap());

    let session = sign_in(&db, member_id).await;
    let app = test_app(db.clone());

    let response = app
        .oneshot(toggle_request(slot_id, &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let slot = db
        .get_meeting_role(slot_id)
        .await
        .expect("Failed to load slot")
        .expect("Slot should exist");
    assert_eq!(slot.member_id, None);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_cannot_take_occupied_role() {
    let db = test_db().await;
    let holder = create_test_member(&db, false).await;
    let challenger = create_test_member(&db, false).await;
    let slot_id = create_test_slot(&db).await;
    assert!(db.claim_role(slot_id, holder).await.unwrap());

    let session = sign_in(&db, challenger).await;
    let app = test_app(db.clone());

    let response = app
        .oneshot(toggle_request(slot_id, &session))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The occupant is unchanged.
    let slot = db
        .get_meeting_role(slot_id)
        .await
        .expect("Failed to load slot")
        .expect("Slot should exist");
    assert_eq!(slot.member_id, Some(holder));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_toggle_requires_session() {
    let db = test_db().await;
    let slot_id = create_test_slot(&db).await;
    let app = test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/meetings/roles/{}/toggle", slot_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_version_endpoint() {
    let db = test_db().await;
    let app = test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["agent"], "speakup-agent");
}
