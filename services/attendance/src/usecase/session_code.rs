use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{ClassSessionRepository, SessionCodeRepository};
use crate::domain::types::{
    ClassSession, SESSION_CODE_LEN, SESSION_CODE_TTL_SECS, SessionCode, ValidityWindow,
};
use crate::error::AttendanceServiceError;
use crate::usecase::{bounded, codegen};

// ── IssueSessionCode ─────────────────────────────────────────────────────────

pub struct IssueSessionCodeInput {
    pub session_id: Uuid,
    pub presenter_id: Uuid,
    /// Defaults to now.
    pub valid_from: Option<DateTime<Utc>>,
    /// Defaults to `valid_from + SESSION_CODE_TTL_SECS`.
    pub valid_until: Option<DateTime<Utc>>,
}

pub struct IssueSessionCodeUseCase<S, C>
where
    S: ClassSessionRepository,
    C: SessionCodeRepository,
{
    pub sessions: S,
    pub codes: C,
    pub store_timeout: Duration,
}

impl<S, C> IssueSessionCodeUseCase<S, C>
where
    S: ClassSessionRepository,
    C: SessionCodeRepository,
{
    pub async fn execute(
        &self,
        input: IssueSessionCodeInput,
    ) -> Result<SessionCode, AttendanceServiceError> {
        // 1. Window first: a malformed request never touches the store
        let now = Utc::now();
        let valid_from = input.valid_from.unwrap_or(now);
        let valid_until = input
            .valid_until
            .unwrap_or(valid_from + chrono::Duration::seconds(SESSION_CODE_TTL_SECS));
        let window = ValidityWindow::new(valid_from, valid_until)?;

        // 2. Session must exist and belong to the caller
        let session = bounded(
            self.store_timeout,
            "find class session",
            self.sessions.find_by_id(input.session_id),
        )
        .await?
        .ok_or(AttendanceServiceError::SessionNotFound)?;
        if session.presenter_id != input.presenter_id {
            return Err(AttendanceServiceError::Forbidden);
        }

        let code = SessionCode {
            id: Uuid::now_v7(),
            session_id: session.id,
            presenter_id: input.presenter_id,
            code: codegen::session_code(SESSION_CODE_LEN),
            window,
            is_active: true,
            created_at: now,
        };
        bounded(
            self.store_timeout,
            "create session code",
            self.codes.create(&code),
        )
        .await?;

        info!(
            session_id = %session.id,
            session_code_id = %code.id,
            valid_until = %window.valid_until(),
            "session code issued"
        );
        Ok(code)
    }
}

// ── ResolveSessionCode (scan) ────────────────────────────────────────────────

#[derive(Debug)]
pub struct ResolvedSession {
    pub session: ClassSession,
    pub session_code_id: Uuid,
}

pub struct ResolveSessionCodeUseCase<S, C>
where
    S: ClassSessionRepository,
    C: SessionCodeRepository,
{
    pub sessions: S,
    pub codes: C,
    pub store_timeout: Duration,
}

impl<S, C> ResolveSessionCodeUseCase<S, C>
where
    S: ClassSessionRepository,
    C: SessionCodeRepository,
{
    pub async fn execute(&self, presented: &str) -> Result<ResolvedSession, AttendanceServiceError> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AttendanceServiceError::UnknownCode);
        }

        let code = bounded(
            self.store_timeout,
            "find session code by value",
            self.codes.find_by_code(presented),
        )
        .await?
        .ok_or(AttendanceServiceError::UnknownCode)?;
        code.ensure_usable(Utc::now())?;

        // Codes cascade with their session, so a miss here is a dangling reference.
        let session = bounded(
            self.store_timeout,
            "find class session",
            self.sessions.find_by_id(code.session_id),
        )
        .await?
        .ok_or(AttendanceServiceError::UnknownCode)?;

        Ok(ResolvedSession {
            session,
            session_code_id: code.id,
        })
    }
}

// ── RevokeSessionCode ────────────────────────────────────────────────────────

pub struct RevokeSessionCodeUseCase<C: SessionCodeRepository> {
    pub codes: C,
    pub store_timeout: Duration,
}

impl<C: SessionCodeRepository> RevokeSessionCodeUseCase<C> {
    pub async fn execute(
        &self,
        presenter_id: Uuid,
        session_id: Uuid,
        code_id: Uuid,
    ) -> Result<(), AttendanceServiceError> {
        let code = bounded(
            self.store_timeout,
            "find session code by id",
            self.codes.find_by_id(code_id),
        )
        .await?
        .filter(|c| c.session_id == session_id)
        .ok_or(AttendanceServiceError::UnknownCode)?;
        if code.presenter_id != presenter_id {
            return Err(AttendanceServiceError::Forbidden);
        }
        if !code.is_active {
            return Ok(());
        }

        bounded(
            self.store_timeout,
            "deactivate session code",
            self.codes.deactivate(code.id),
        )
        .await?;
        info!(session_id = %session_id, session_code_id = %code.id, "session code revoked");
        Ok(())
    }
}
