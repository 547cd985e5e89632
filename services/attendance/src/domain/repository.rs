#![allow(async_fn_in_trait)]

use uuid::Uuid;

use campus_domain::pagination::PageRequest;

use crate::domain::types::{
    AttendanceRecord, ClassSession, CodeMessage, SessionCode, VerificationCode,
};
use crate::error::AttendanceServiceError;

/// Read access to scheduled class sessions.
pub trait ClassSessionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassSession>, AttendanceServiceError>;
}

/// Read access to profiles mirrored from the identity provider.
pub trait ProfileRepository: Send + Sync {
    /// Registered contact address (email) of a profile.
    async fn find_contact(&self, profile_id: Uuid)
    -> Result<Option<String>, AttendanceServiceError>;
}

/// Repository for presenter-issued session codes.
pub trait SessionCodeRepository: Send + Sync {
    async fn create(&self, code: &SessionCode) -> Result<(), AttendanceServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionCode>, AttendanceServiceError>;

    /// Exact match on the presented code string.
    async fn find_by_code(&self, code: &str)
    -> Result<Option<SessionCode>, AttendanceServiceError>;

    /// Set `is_active = false`. Idempotent.
    async fn deactivate(&self, id: Uuid) -> Result<(), AttendanceServiceError>;
}

/// Repository for per-(session, claimant) verification codes.
pub trait VerificationCodeRepository: Send + Sync {
    async fn find(
        &self,
        session_id: Uuid,
        claimant_id: Uuid,
    ) -> Result<Option<VerificationCode>, AttendanceServiceError>;

    /// Insert the pair's code, overwriting any previous one (at most one live code per pair).
    async fn replace(&self, code: &VerificationCode) -> Result<(), AttendanceServiceError>;

    /// Persist `attempts`, `verified` and `verified_at` of an existing code.
    async fn save_progress(&self, code: &VerificationCode) -> Result<(), AttendanceServiceError>;
}

/// Repository for attendance records, keyed by (session, claimant).
pub trait AttendanceRepository: Send + Sync {
    /// Insert unless the key already exists, then return the stored record.
    ///
    /// The boolean is `true` when this call created the record. A duplicate is not an
    /// error: the existing record comes back unchanged.
    async fn insert_if_absent(
        &self,
        record: &AttendanceRecord,
    ) -> Result<(AttendanceRecord, bool), AttendanceServiceError>;

    /// Newest first.
    async fn list_by_claimant(
        &self,
        claimant_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError>;

    /// Oldest first (arrival order).
    async fn list_by_session(
        &self,
        session_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError>;
}

/// Port to the external email/SMS delivery service.
pub trait ContactDelivery: Send + Sync {
    /// Hand the code over for delivery. Failures map to `DeliveryFailure`.
    async fn deliver(&self, message: &CodeMessage) -> Result<(), AttendanceServiceError>;
}
