use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use campus_domain::attendance::AttendanceStatus;

use crate::error::AttendanceServiceError;

/// One scheduled class occurrence. Owned by scheduling; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSession {
    pub id: Uuid,
    pub class_id: Uuid,
    pub subject: String,
    pub room: Option<String>,
    pub presenter_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl ClassSession {
    /// Status for a claimant verified at `now`: late once `late_grace` past the start.
    pub fn status_at(&self, now: DateTime<Utc>, late_grace: Duration) -> AttendanceStatus {
        if now >= self.starts_at + late_grace {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

/// Half-open validity window `[valid_from, valid_until)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn new(
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Result<Self, AttendanceServiceError> {
        if valid_from >= valid_until {
            return Err(AttendanceServiceError::InvalidWindow);
        }
        Ok(Self {
            valid_from,
            valid_until,
        })
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at < self.valid_until
    }
}

/// Credential a presenter displays for one class session (rendered as a QR code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCode {
    pub id: Uuid,
    pub session_id: Uuid,
    pub presenter_id: Uuid,
    pub code: String,
    pub window: ValidityWindow,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionCode {
    /// Revocation is reported before the window so a revoked code never reads as "expired".
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), AttendanceServiceError> {
        if !self.is_active {
            return Err(AttendanceServiceError::RevokedCode);
        }
        if !self.window.contains(now) {
            return Err(AttendanceServiceError::ExpiredCode);
        }
        Ok(())
    }
}

/// Derived state of a (session, claimant) verification challenge.
/// `Unstarted` is the absence of a stored code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Issued,
    Verified,
    Expired,
}

/// What a successful redemption means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Transitioned `Issued → Verified` on this call.
    Fresh,
    /// Already verified earlier; no new side effect.
    Replayed,
}

/// Single-use code sent to the claimant's contact address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub id: Uuid,
    pub session_id: Uuid,
    pub claimant_id: Uuid,
    /// The scanned session code this challenge was started from.
    pub session_code_id: Option<Uuid>,
    pub contact: String,
    pub code: String,
    pub attempts: i16,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn state(&self, now: DateTime<Utc>) -> ChallengeState {
        if self.verified {
            ChallengeState::Verified
        } else if now >= self.expires_at || self.attempts >= MAX_VERIFICATION_ATTEMPTS {
            ChallengeState::Expired
        } else {
            ChallengeState::Issued
        }
    }

    fn matches(&self, submitted: &str) -> bool {
        self.code.as_bytes().ct_eq(submitted.trim().as_bytes()).into()
    }

    /// Run one redemption attempt, mutating attempts / verified in place.
    ///
    /// The caller persists `self` whenever it changed, including on `Mismatch`
    /// and `AttemptsExhausted`, so the attempt counter survives the error.
    pub fn redeem(
        &mut self,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, AttendanceServiceError> {
        if self.verified {
            return if self.matches(submitted) {
                Ok(Redemption::Replayed)
            } else {
                Err(AttendanceServiceError::Mismatch)
            };
        }
        if now >= self.expires_at {
            return Err(AttendanceServiceError::ExpiredCode);
        }
        if self.attempts >= MAX_VERIFICATION_ATTEMPTS {
            return Err(AttendanceServiceError::AttemptsExhausted);
        }
        if !self.matches(submitted) {
            self.attempts += 1;
            return if self.attempts >= MAX_VERIFICATION_ATTEMPTS {
                Err(AttendanceServiceError::AttemptsExhausted)
            } else {
                Err(AttendanceServiceError::Mismatch)
            };
        }
        self.verified = true;
        self.verified_at = Some(now);
        Ok(Redemption::Fresh)
    }
}

/// Terminal attendance artifact, one per (session, claimant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub session_id: Uuid,
    pub claimant_id: Uuid,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
    pub session_code_id: Option<Uuid>,
    pub verification_code_id: Option<Uuid>,
}

/// Payload handed to the contact-delivery service.
#[derive(Debug, Clone, Serialize)]
pub struct CodeMessage {
    pub address: String,
    pub code: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

/// Verification code length in decimal digits.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Verification code time-to-live in seconds.
pub const VERIFICATION_CODE_TTL_SECS: i64 = 300;

/// Consecutive mismatches after which a verification code is dead.
pub const MAX_VERIFICATION_ATTEMPTS: i16 = 5;

/// Session code length in characters.
pub const SESSION_CODE_LEN: usize = 32;

/// Default session code window when the presenter does not pick one.
pub const SESSION_CODE_TTL_SECS: i64 = 600;
