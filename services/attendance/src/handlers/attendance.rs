use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use campus_auth_types::identity::IdentityHeaders;
use campus_domain::attendance::AttendanceStatus;
use campus_domain::pagination::PageRequest;

use crate::domain::types::AttendanceRecord;
use crate::error::AttendanceServiceError;
use crate::state::AppState;
use crate::usecase::attendance::{ListClaimantAttendanceUseCase, ListSessionAttendanceUseCase};

#[derive(Serialize)]
pub struct AttendanceResponse {
    pub session_id: Uuid,
    pub claimant_id: Uuid,
    pub status: AttendanceStatus,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub marked_at: DateTime<Utc>,
    pub session_code_id: Option<Uuid>,
    pub verification_code_id: Option<Uuid>,
}

impl From<AttendanceRecord> for AttendanceResponse {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            session_id: r.session_id,
            claimant_id: r.claimant_id,
            status: r.status,
            marked_at: r.marked_at,
            session_code_id: r.session_code_id,
            verification_code_id: r.verification_code_id,
        }
    }
}

// ── GET /attendance/@me ──────────────────────────────────────────────────────

pub async fn list_my_attendance(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AttendanceResponse>>, AttendanceServiceError> {
    let usecase = ListClaimantAttendanceUseCase {
        records: state.attendance_repo(),
        store_timeout: state.store_timeout,
    };
    let records = usecase.execute(identity.user_id, page).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

// ── GET /sessions/{session_id}/attendance ────────────────────────────────────

pub async fn list_session_attendance(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AttendanceResponse>>, AttendanceServiceError> {
    identity
        .require_presenter()
        .map_err(|_| AttendanceServiceError::Forbidden)?;

    let usecase = ListSessionAttendanceUseCase {
        sessions: state.class_session_repo(),
        records: state.attendance_repo(),
        store_timeout: state.store_timeout,
    };
    let records = usecase.execute(identity.user_id, session_id, page).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
