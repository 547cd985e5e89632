use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repository::{ContactDelivery, ProfileRepository, VerificationCodeRepository};
use crate::domain::types::{
    ClassSession, CodeMessage, Redemption, VERIFICATION_CODE_LEN, VERIFICATION_CODE_TTL_SECS,
    VerificationCode,
};
use crate::error::AttendanceServiceError;
use crate::locks::PairLocks;
use crate::usecase::{bounded, codegen};

// ── IssueVerificationCode ────────────────────────────────────────────────────

pub struct IssueVerificationCodeInput {
    pub session: ClassSession,
    pub claimant_id: Uuid,
    /// Session code the claimant scanned, if the challenge started from one.
    pub session_code_id: Option<Uuid>,
}

pub struct IssueVerificationCodeUseCase<P, C, D>
where
    P: ProfileRepository,
    C: VerificationCodeRepository,
    D: ContactDelivery,
{
    pub profiles: P,
    pub codes: C,
    pub delivery: D,
    pub locks: PairLocks,
    pub delivery_timeout: Duration,
    pub store_timeout: Duration,
}

impl<P, C, D> IssueVerificationCodeUseCase<P, C, D>
where
    P: ProfileRepository,
    C: VerificationCodeRepository,
    D: ContactDelivery,
{
    /// Issue (or re-issue) the pair's code and hand it to delivery.
    ///
    /// Re-issuing overwrites the stored row, so any earlier code stops matching.
    pub async fn execute(
        &self,
        input: IssueVerificationCodeInput,
    ) -> Result<VerificationCode, AttendanceServiceError> {
        let session_id = input.session.id;
        let claimant_id = input.claimant_id;
        let _guard = self.locks.acquire(session_id, claimant_id).await;

        let existing = bounded(
            self.store_timeout,
            "find verification code",
            self.codes.find(session_id, claimant_id),
        )
        .await?;
        if existing.is_some_and(|c| c.verified) {
            return Err(AttendanceServiceError::AlreadyVerified);
        }

        let contact = bounded(
            self.store_timeout,
            "find claimant contact",
            self.profiles.find_contact(claimant_id),
        )
        .await?
        .ok_or(AttendanceServiceError::ClaimantNotFound)?;

        let now = Utc::now();
        let code = VerificationCode {
            id: Uuid::now_v7(),
            session_id,
            claimant_id,
            session_code_id: input.session_code_id,
            contact,
            code: codegen::verification_code(VERIFICATION_CODE_LEN),
            attempts: 0,
            expires_at: now + chrono::Duration::seconds(VERIFICATION_CODE_TTL_SECS),
            verified: false,
            verified_at: None,
            created_at: now,
        };
        bounded(
            self.store_timeout,
            "replace verification code",
            self.codes.replace(&code),
        )
        .await?;

        let message = CodeMessage {
            address: code.contact.clone(),
            code: code.code.clone(),
            subject: input.session.subject.clone(),
            expires_at: code.expires_at,
        };
        match tokio::time::timeout(self.delivery_timeout, self.delivery.deliver(&message)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    session_id = %session_id,
                    claimant_id = %claimant_id,
                    timeout_ms = self.delivery_timeout.as_millis() as u64,
                    "verification code delivery timed out"
                );
                return Err(AttendanceServiceError::DeliveryFailure);
            }
        }

        info!(
            session_id = %session_id,
            claimant_id = %claimant_id,
            verification_code_id = %code.id,
            "verification code issued"
        );
        Ok(code)
    }
}

// ── RedeemVerificationCode ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct RedeemOutcome {
    pub code: VerificationCode,
    pub redemption: Redemption,
}

/// Runs the challenge state machine and persists its progress.
///
/// Does not lock: callers that need issue/redeem exclusion hold the pair's
/// lock from [`PairLocks`] around `execute`.
pub struct RedeemVerificationCodeUseCase<C: VerificationCodeRepository> {
    pub codes: C,
    pub store_timeout: Duration,
}

impl<C: VerificationCodeRepository> RedeemVerificationCodeUseCase<C> {
    pub async fn execute(
        &self,
        session_id: Uuid,
        claimant_id: Uuid,
        submitted: &str,
    ) -> Result<RedeemOutcome, AttendanceServiceError> {
        let stored = bounded(
            self.store_timeout,
            "find verification code",
            self.codes.find(session_id, claimant_id),
        )
        .await?
        .ok_or(AttendanceServiceError::UnknownCode)?;

        let mut code = stored.clone();
        let result = code.redeem(submitted, Utc::now());
        if code != stored {
            bounded(
                self.store_timeout,
                "save verification progress",
                self.codes.save_progress(&code),
            )
            .await?;
        }

        match result {
            Ok(redemption) => Ok(RedeemOutcome { code, redemption }),
            Err(e) => {
                info!(
                    session_id = %session_id,
                    claimant_id = %claimant_id,
                    attempts = code.attempts,
                    kind = e.kind(),
                    "verification code rejected"
                );
                Err(e)
            }
        }
    }
}
