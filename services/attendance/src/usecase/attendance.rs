use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use campus_domain::pagination::PageRequest;

use crate::domain::repository::{AttendanceRepository, ClassSessionRepository};
use crate::domain::types::AttendanceRecord;
use crate::error::AttendanceServiceError;
use crate::usecase::bounded;

// ── RecordAttendance ─────────────────────────────────────────────────────────

pub struct RecordAttendanceUseCase<R: AttendanceRepository> {
    pub records: R,
    pub store_timeout: Duration,
}

impl<R: AttendanceRepository> RecordAttendanceUseCase<R> {
    /// First writer wins: a duplicate returns the stored record unchanged.
    pub async fn execute(
        &self,
        record: AttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        let (stored, created) =
            tokio::time::timeout(self.store_timeout, self.records.insert_if_absent(&record))
                .await
                .map_err(|_| {
                    warn!(
                        session_id = %record.session_id,
                        claimant_id = %record.claimant_id,
                        "attendance insert timed out"
                    );
                    AttendanceServiceError::StoreTimeout
                })??;

        if created {
            info!(
                session_id = %stored.session_id,
                claimant_id = %stored.claimant_id,
                status = %stored.status,
                "attendance recorded"
            );
        }
        Ok(stored)
    }
}

// ── ListClaimantAttendance ───────────────────────────────────────────────────

pub struct ListClaimantAttendanceUseCase<R: AttendanceRepository> {
    pub records: R,
    pub store_timeout: Duration,
}

impl<R: AttendanceRepository> ListClaimantAttendanceUseCase<R> {
    pub async fn execute(
        &self,
        claimant_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        bounded(
            self.store_timeout,
            "list attendance by claimant",
            self.records.list_by_claimant(claimant_id, page.clamped()),
        )
        .await
    }
}

// ── ListSessionAttendance (roster) ───────────────────────────────────────────

pub struct ListSessionAttendanceUseCase<S, R>
where
    S: ClassSessionRepository,
    R: AttendanceRepository,
{
    pub sessions: S,
    pub records: R,
    pub store_timeout: Duration,
}

impl<S, R> ListSessionAttendanceUseCase<S, R>
where
    S: ClassSessionRepository,
    R: AttendanceRepository,
{
    pub async fn execute(
        &self,
        presenter_id: Uuid,
        session_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        let session = bounded(
            self.store_timeout,
            "find class session",
            self.sessions.find_by_id(session_id),
        )
        .await?
        .ok_or(AttendanceServiceError::SessionNotFound)?;
        if session.presenter_id != presenter_id {
            return Err(AttendanceServiceError::Forbidden);
        }
        bounded(
            self.store_timeout,
            "list attendance by session",
            self.records.list_by_session(session_id, page.clamped()),
        )
        .await
    }
}
