use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_auth_types::identity::IdentityHeaders;

use crate::domain::types::SessionCode;
use crate::error::AttendanceServiceError;
use crate::state::AppState;
use crate::usecase::session_code::{
    IssueSessionCodeInput, IssueSessionCodeUseCase, RevokeSessionCodeUseCase,
};

/// Both bounds are optional; an empty object gets the default ten-minute window.
#[derive(Deserialize)]
pub struct IssueSessionCodeRequest {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct SessionCodeResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub code: String,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub valid_from: DateTime<Utc>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}

impl From<SessionCode> for SessionCodeResponse {
    fn from(c: SessionCode) -> Self {
        Self {
            id: c.id,
            session_id: c.session_id,
            code: c.code,
            valid_from: c.window.valid_from(),
            valid_until: c.window.valid_until(),
            is_active: c.is_active,
        }
    }
}

// ── POST /sessions/{session_id}/codes ────────────────────────────────────────

pub async fn issue_session_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<IssueSessionCodeRequest>,
) -> Result<(StatusCode, Json<SessionCodeResponse>), AttendanceServiceError> {
    identity
        .require_presenter()
        .map_err(|_| AttendanceServiceError::Forbidden)?;

    let usecase = IssueSessionCodeUseCase {
        sessions: state.class_session_repo(),
        codes: state.session_code_repo(),
        store_timeout: state.store_timeout,
    };
    let code = usecase
        .execute(IssueSessionCodeInput {
            session_id,
            presenter_id: identity.user_id,
            valid_from: body.valid_from,
            valid_until: body.valid_until,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(code.into())))
}

// ── DELETE /sessions/{session_id}/codes/{code_id} ────────────────────────────

pub async fn revoke_session_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((session_id, code_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AttendanceServiceError> {
    identity
        .require_presenter()
        .map_err(|_| AttendanceServiceError::Forbidden)?;

    let usecase = RevokeSessionCodeUseCase {
        codes: state.session_code_repo(),
        store_timeout: state.store_timeout,
    };
    usecase
        .execute(identity.user_id, session_id, code_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
