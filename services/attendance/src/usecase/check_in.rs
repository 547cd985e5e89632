use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{
    AttendanceRepository, ClassSessionRepository, VerificationCodeRepository,
};
use crate::domain::types::{AttendanceRecord, Redemption};
use crate::error::AttendanceServiceError;
use crate::locks::PairLocks;
use crate::usecase::attendance::RecordAttendanceUseCase;
use crate::usecase::bounded;
use crate::usecase::challenge::RedeemVerificationCodeUseCase;

pub struct VerifyAttendanceInput {
    pub session_id: Uuid,
    pub claimant_id: Uuid,
    pub otp: String,
}

#[derive(Debug)]
pub struct CheckIn {
    pub record: AttendanceRecord,
    pub redemption: Redemption,
}

/// Redeem the claimant's code and record attendance, one pair at a time.
pub struct VerifyAttendanceUseCase<S, C, R>
where
    S: ClassSessionRepository,
    C: VerificationCodeRepository,
    R: AttendanceRepository,
{
    pub sessions: S,
    pub redeem: RedeemVerificationCodeUseCase<C>,
    pub record: RecordAttendanceUseCase<R>,
    pub locks: PairLocks,
    pub late_grace: chrono::Duration,
    pub store_timeout: Duration,
}

impl<S, C, R> VerifyAttendanceUseCase<S, C, R>
where
    S: ClassSessionRepository,
    C: VerificationCodeRepository,
    R: AttendanceRepository,
{
    pub async fn execute(
        &self,
        input: VerifyAttendanceInput,
    ) -> Result<CheckIn, AttendanceServiceError> {
        let session = bounded(
            self.store_timeout,
            "find class session",
            self.sessions.find_by_id(input.session_id),
        )
        .await?
        .ok_or(AttendanceServiceError::SessionNotFound)?;

        let _guard = self.locks.acquire(session.id, input.claimant_id).await;
        let outcome = self
            .redeem
            .execute(session.id, input.claimant_id, &input.otp)
            .await?;

        // A replay still goes through the insert: if an earlier attempt verified the
        // code but never got its record stored, this is where it lands.
        let verified_at = outcome.code.verified_at.unwrap_or_else(Utc::now);
        let record = self
            .record
            .execute(AttendanceRecord {
                session_id: session.id,
                claimant_id: input.claimant_id,
                status: session.status_at(verified_at, self.late_grace),
                marked_at: verified_at,
                session_code_id: outcome.code.session_code_id,
                verification_code_id: Some(outcome.code.id),
            })
            .await?;

        Ok(CheckIn {
            record,
            redemption: outcome.redemption,
        })
    }
}
