use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_auth_types::identity::IdentityHeaders;

use crate::error::AttendanceServiceError;
use crate::handlers::attendance::AttendanceResponse;
use crate::state::AppState;
use crate::usecase::attendance::RecordAttendanceUseCase;
use crate::usecase::challenge::{
    IssueVerificationCodeInput, IssueVerificationCodeUseCase, RedeemVerificationCodeUseCase,
};
use crate::usecase::check_in::{VerifyAttendanceInput, VerifyAttendanceUseCase};
use crate::usecase::session_code::ResolveSessionCodeUseCase;

#[derive(Deserialize)]
pub struct PresentedCodeRequest {
    /// Value decoded from the presenter's QR code.
    pub code: String,
}

// ── POST /attendance/scan ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ScanResponse {
    pub session_id: Uuid,
    pub session_code_id: Uuid,
    pub class_id: Uuid,
    pub subject: String,
    pub room: Option<String>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub starts_at: DateTime<Utc>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub ends_at: DateTime<Utc>,
}

pub async fn scan(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<PresentedCodeRequest>,
) -> Result<Json<ScanResponse>, AttendanceServiceError> {
    let usecase = ResolveSessionCodeUseCase {
        sessions: state.class_session_repo(),
        codes: state.session_code_repo(),
        store_timeout: state.store_timeout,
    };
    let resolved = usecase.execute(&body.code).await?;
    let session = resolved.session;
    Ok(Json(ScanResponse {
        session_id: session.id,
        session_code_id: resolved.session_code_id,
        class_id: session.class_id,
        subject: session.subject,
        room: session.room,
        starts_at: session.starts_at,
        ends_at: session.ends_at,
    }))
}

// ── POST /attendance/otp ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OtpIssuedResponse {
    pub session_id: Uuid,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn issue_otp(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<PresentedCodeRequest>,
) -> Result<(StatusCode, Json<OtpIssuedResponse>), AttendanceServiceError> {
    let resolve = ResolveSessionCodeUseCase {
        sessions: state.class_session_repo(),
        codes: state.session_code_repo(),
        store_timeout: state.store_timeout,
    };
    let resolved = resolve.execute(&body.code).await?;

    let usecase = IssueVerificationCodeUseCase {
        profiles: state.profile_repo(),
        codes: state.verification_code_repo(),
        delivery: state.delivery.clone(),
        locks: state.locks.clone(),
        delivery_timeout: state.delivery_timeout,
        store_timeout: state.store_timeout,
    };
    let code = usecase
        .execute(IssueVerificationCodeInput {
            session: resolved.session,
            claimant_id: identity.user_id,
            session_code_id: Some(resolved.session_code_id),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(OtpIssuedResponse {
            session_id: code.session_id,
            expires_at: code.expires_at,
        }),
    ))
}

// ── POST /attendance/otp/verify ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub session_id: Uuid,
    pub otp: String,
}

pub async fn verify_otp(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<AttendanceResponse>, AttendanceServiceError> {
    let usecase = VerifyAttendanceUseCase {
        sessions: state.class_session_repo(),
        redeem: RedeemVerificationCodeUseCase {
            codes: state.verification_code_repo(),
            store_timeout: state.store_timeout,
        },
        record: RecordAttendanceUseCase {
            records: state.attendance_repo(),
            store_timeout: state.store_timeout,
        },
        locks: state.locks.clone(),
        late_grace: state.late_grace,
        store_timeout: state.store_timeout,
    };
    let check_in = usecase
        .execute(VerifyAttendanceInput {
            session_id: body.session_id,
            claimant_id: identity.user_id,
            otp: body.otp,
        })
        .await?;
    Ok(Json(check_in.record.into()))
}
