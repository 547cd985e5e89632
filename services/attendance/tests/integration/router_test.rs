use std::sync::Arc;
use std::time::Duration;

use axum::body::to_bytes;
use axum::http::{Method, StatusCode};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use campus_attendance::infra::delivery::{ConfiguredDelivery, LogDelivery};
use campus_attendance::locks::PairLocks;
use campus_attendance::router::build_router;
use campus_attendance::state::AppState;
use campus_attendance_schema::{
    attendance_records, class_sessions, profiles, session_codes, verification_codes,
};
use campus_testing::auth::MockAuth;
use campus_testing::request::json_request;

fn state_with(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        delivery: ConfiguredDelivery::Log(LogDelivery),
        locks: PairLocks::new(),
        delivery_timeout: Duration::from_secs(1),
        store_timeout: Duration::from_secs(1),
        late_grace: chrono::Duration::minutes(15),
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn class_session_model(id: Uuid, presenter_id: Uuid) -> class_sessions::Model {
    let now = Utc::now();
    class_sessions::Model {
        id,
        class_id: Uuid::new_v4(),
        subject: "Data Structures".to_owned(),
        room: None,
        presenter_id,
        starts_at: now,
        ends_at: now + chrono::Duration::hours(1),
    }
}

fn session_code_model(session_id: Uuid, presenter_id: Uuid, code: &str) -> session_codes::Model {
    let now = Utc::now();
    session_codes::Model {
        id: Uuid::new_v4(),
        session_id,
        presenter_id,
        code: code.to_owned(),
        valid_from: now - chrono::Duration::minutes(1),
        valid_until: now + chrono::Duration::minutes(9),
        is_active: true,
        created_at: now,
    }
}

fn verification_code_model(
    session_id: Uuid,
    claimant_id: Uuid,
    code: &str,
) -> verification_codes::Model {
    let now = Utc::now();
    verification_codes::Model {
        id: Uuid::new_v4(),
        session_id,
        claimant_id,
        session_code_id: None,
        contact: "student@campus.test".to_owned(),
        code: code.to_owned(),
        attempts: 0,
        expires_at: now + chrono::Duration::minutes(5),
        verified: false,
        verified_at: None,
        created_at: now,
    }
}

fn attendance_model(session_id: Uuid, claimant_id: Uuid) -> attendance_records::Model {
    attendance_records::Model {
        session_id,
        claimant_id,
        status: "present".to_owned(),
        marked_at: Utc::now(),
        session_code_id: None,
        verification_code_id: None,
    }
}

fn one_row_affected() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

#[tokio::test]
async fn should_answer_healthz_with_request_id() {
    let app = build_router(state_with(empty_db()));
    let resp = app
        .oneshot(json_request(Method::GET, "/healthz", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_answer_readyz_when_database_reachable() {
    let app = build_router(state_with(empty_db()));
    let resp = app
        .oneshot(json_request(Method::GET, "/readyz", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_missing_identity() {
    let app = build_router(state_with(empty_db()));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/scan",
            None,
            Some(json!({ "code": "ANY" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_students_from_issuing_session_codes() {
    let app = build_router(state_with(empty_db()));
    let student = MockAuth::student();
    let uri = format!("/sessions/{}/codes", Uuid::new_v4());
    let resp = app
        .oneshot(json_request(
            Method::POST,
            &uri,
            Some(&student),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_reject_inverted_window() {
    let app = build_router(state_with(empty_db()));
    let teacher = MockAuth::teacher();
    let uri = format!("/sessions/{}/codes", Uuid::new_v4());
    let resp = app
        .oneshot(json_request(
            Method::POST,
            &uri,
            Some(&teacher),
            Some(json!({
                "valid_from": "2026-09-14T09:10:00Z",
                "valid_until": "2026-09-14T09:00:00Z",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["kind"], "INVALID_WINDOW");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn should_return_404_for_unknown_scanned_code() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<session_codes::Model>::new()])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/scan",
            Some(&MockAuth::student()),
            Some(json!({ "code": "NOPE" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["kind"], "UNKNOWN_CODE");
}

#[tokio::test]
async fn should_return_410_for_revoked_scanned_code() {
    let session_id = Uuid::new_v4();
    let now = Utc::now();
    let code = session_codes::Model {
        id: Uuid::new_v4(),
        session_id,
        presenter_id: Uuid::new_v4(),
        code: "REVOKED".to_owned(),
        valid_from: now - chrono::Duration::minutes(1),
        valid_until: now + chrono::Duration::minutes(9),
        is_active: false,
        created_at: now,
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![code]])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/scan",
            Some(&MockAuth::student()),
            Some(json!({ "code": "REVOKED" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::GONE);
    assert_eq!(body_json(resp).await["kind"], "REVOKED_CODE");
}

#[tokio::test]
async fn should_forbid_roster_for_other_presenter() {
    let session_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![class_session_model(session_id, Uuid::new_v4())]])
        .into_connection();
    let app = build_router(state_with(db));
    let uri = format!("/sessions/{session_id}/attendance");
    let resp = app
        .oneshot(json_request(
            Method::GET,
            &uri,
            Some(&MockAuth::teacher()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_return_404_when_verifying_unknown_session() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<class_sessions::Model>::new()])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/otp/verify",
            Some(&MockAuth::student()),
            Some(json!({ "session_id": Uuid::new_v4(), "otp": "483920" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["kind"], "SESSION_NOT_FOUND");
}

// ── Happy paths ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_session_code_with_default_window() {
    let teacher = MockAuth::teacher();
    let session_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![class_session_model(session_id, teacher.user_id)]])
        // INSERT ... RETURNING
        .append_query_results([vec![session_code_model(
            session_id,
            teacher.user_id,
            "STORED",
        )]])
        .into_connection();
    let app = build_router(state_with(db));
    let uri = format!("/sessions/{session_id}/codes");
    let resp = app
        .oneshot(json_request(
            Method::POST,
            &uri,
            Some(&teacher),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["session_id"], session_id.to_string());
    assert_eq!(body["is_active"], true);
    assert_eq!(body["code"].as_str().unwrap().len(), 32);
    assert!(body["valid_until"].is_string());
}

#[tokio::test]
async fn should_revoke_session_code_with_no_content() {
    let teacher = MockAuth::teacher();
    let session_id = Uuid::new_v4();
    let code = session_code_model(session_id, teacher.user_id, "LIVE");
    let code_id = code.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![code]])
        .append_exec_results([one_row_affected()])
        .into_connection();
    let app = build_router(state_with(db));
    let uri = format!("/sessions/{session_id}/codes/{code_id}");
    let resp = app
        .oneshot(json_request(Method::DELETE, &uri, Some(&teacher), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn should_resolve_scanned_code_to_session() {
    let session_id = Uuid::new_v4();
    let presenter_id = Uuid::new_v4();
    let code = session_code_model(session_id, presenter_id, "LIVE");
    let code_id = code.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![code]])
        .append_query_results([vec![class_session_model(session_id, presenter_id)]])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/scan",
            Some(&MockAuth::student()),
            Some(json!({ "code": "LIVE" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["session_id"], session_id.to_string());
    assert_eq!(body["session_code_id"], code_id.to_string());
    assert_eq!(body["subject"], "Data Structures");
}

#[tokio::test]
async fn should_issue_otp_for_scanned_code() {
    let student = MockAuth::student();
    let session_id = Uuid::new_v4();
    let presenter_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![session_code_model(session_id, presenter_id, "LIVE")]])
        .append_query_results([vec![class_session_model(session_id, presenter_id)]])
        .append_query_results([Vec::<verification_codes::Model>::new()])
        .append_query_results([vec![profiles::Model {
            id: student.user_id,
            email: "student@campus.test".to_owned(),
            role: 0,
        }]])
        .append_exec_results([one_row_affected()])
        .into_connection();
    let app = build_router(state_with(db));
    let before = Utc::now();
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/otp",
            Some(&student),
            Some(json!({ "code": "LIVE" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["session_id"], session_id.to_string());
    let expires_at: chrono::DateTime<Utc> = body["expires_at"].as_str().unwrap().parse().unwrap();
    assert!(expires_at > before + chrono::Duration::minutes(4));
}

#[tokio::test]
async fn should_record_attendance_on_verified_otp() {
    let student = MockAuth::student();
    let session_id = Uuid::new_v4();
    let stored = verification_code_model(session_id, student.user_id, "483920");
    let mut progressed = stored.clone();
    progressed.verified = true;
    progressed.verified_at = Some(Utc::now());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![class_session_model(session_id, Uuid::new_v4())]])
        .append_query_results([vec![stored]])
        // UPDATE ... RETURNING
        .append_query_results([vec![progressed]])
        .append_exec_results([one_row_affected()])
        .append_query_results([vec![attendance_model(session_id, student.user_id)]])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/attendance/otp/verify",
            Some(&student),
            Some(json!({ "session_id": session_id, "otp": "483920" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["session_id"], session_id.to_string());
    assert_eq!(body["claimant_id"], student.user_id.to_string());
    assert_eq!(body["status"], "present");
}

#[tokio::test]
async fn should_list_my_attendance() {
    let student = MockAuth::student();
    let session_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![attendance_model(session_id, student.user_id)]])
        .into_connection();
    let app = build_router(state_with(db));
    let resp = app
        .oneshot(json_request(
            Method::GET,
            "/attendance/@me?per-page=10&page=1",
            Some(&student),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["session_id"], session_id.to_string());
}

#[tokio::test]
async fn should_list_roster_for_own_session() {
    let teacher = MockAuth::teacher();
    let session_id = Uuid::new_v4();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![class_session_model(session_id, teacher.user_id)]])
        .append_query_results([vec![
            attendance_model(session_id, first),
            attendance_model(session_id, second),
        ]])
        .into_connection();
    let app = build_router(state_with(db));
    let uri = format!("/sessions/{session_id}/attendance");
    let resp = app
        .oneshot(json_request(Method::GET, &uri, Some(&teacher), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["claimant_id"], first.to_string());
}
