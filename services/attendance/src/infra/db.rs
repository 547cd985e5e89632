use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use campus_attendance_schema::{
    attendance_records, class_sessions, profiles, session_codes, verification_codes,
};
use campus_domain::attendance::AttendanceStatus;
use campus_domain::pagination::PageRequest;

use crate::domain::repository::{
    AttendanceRepository, ClassSessionRepository, ProfileRepository, SessionCodeRepository,
    VerificationCodeRepository,
};
use crate::domain::types::{
    AttendanceRecord, ClassSession, SessionCode, ValidityWindow, VerificationCode,
};
use crate::error::AttendanceServiceError;

// ── ClassSession repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbClassSessionRepository {
    pub db: Arc<DatabaseConnection>,
}

impl ClassSessionRepository for DbClassSessionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassSession>, AttendanceServiceError> {
        let model = class_sessions::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find class session")?;
        Ok(model.map(class_session_from_model))
    }
}

fn class_session_from_model(model: class_sessions::Model) -> ClassSession {
    ClassSession {
        id: model.id,
        class_id: model.class_id,
        subject: model.subject,
        room: model.room,
        presenter_id: model.presenter_id,
        starts_at: model.starts_at,
        ends_at: model.ends_at,
    }
}

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: Arc<DatabaseConnection>,
}

impl ProfileRepository for DbProfileRepository {
    async fn find_contact(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<String>, AttendanceServiceError> {
        let model = profiles::Entity::find_by_id(profile_id)
            .one(self.db.as_ref())
            .await
            .context("find profile contact")?;
        Ok(model.map(|m| m.email))
    }
}

// ── SessionCode repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionCodeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl SessionCodeRepository for DbSessionCodeRepository {
    async fn create(&self, code: &SessionCode) -> Result<(), AttendanceServiceError> {
        session_codes::ActiveModel {
            id: Set(code.id),
            session_id: Set(code.session_id),
            presenter_id: Set(code.presenter_id),
            code: Set(code.code.clone()),
            valid_from: Set(code.window.valid_from()),
            valid_until: Set(code.window.valid_until()),
            is_active: Set(code.is_active),
            created_at: Set(code.created_at),
        }
        .insert(self.db.as_ref())
        .await
        .context("create session code")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionCode>, AttendanceServiceError> {
        let model = session_codes::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find session code by id")?;
        model.map(session_code_from_model).transpose()
    }

    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<SessionCode>, AttendanceServiceError> {
        let model = session_codes::Entity::find()
            .filter(session_codes::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .context("find session code by value")?;
        model.map(session_code_from_model).transpose()
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), AttendanceServiceError> {
        session_codes::Entity::update_many()
            .col_expr(session_codes::Column::IsActive, Expr::value(false))
            .filter(session_codes::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .context("deactivate session code")?;
        Ok(())
    }
}

fn session_code_from_model(
    model: session_codes::Model,
) -> Result<SessionCode, AttendanceServiceError> {
    let window = ValidityWindow::new(model.valid_from, model.valid_until)
        .map_err(|_| anyhow::anyhow!("session code {} has an empty validity window", model.id))?;
    Ok(SessionCode {
        id: model.id,
        session_id: model.session_id,
        presenter_id: model.presenter_id,
        code: model.code,
        window,
        is_active: model.is_active,
        created_at: model.created_at,
    })
}

// ── VerificationCode repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn find(
        &self,
        session_id: Uuid,
        claimant_id: Uuid,
    ) -> Result<Option<VerificationCode>, AttendanceServiceError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::SessionId.eq(session_id))
            .filter(verification_codes::Column::ClaimantId.eq(claimant_id))
            .one(self.db.as_ref())
            .await
            .context("find verification code")?;
        Ok(model.map(verification_code_from_model))
    }

    async fn replace(&self, code: &VerificationCode) -> Result<(), AttendanceServiceError> {
        let model = verification_codes::ActiveModel {
            id: Set(code.id),
            session_id: Set(code.session_id),
            claimant_id: Set(code.claimant_id),
            session_code_id: Set(code.session_code_id),
            contact: Set(code.contact.clone()),
            code: Set(code.code.clone()),
            attempts: Set(code.attempts),
            expires_at: Set(code.expires_at),
            verified: Set(code.verified),
            verified_at: Set(code.verified_at),
            created_at: Set(code.created_at),
        };
        verification_codes::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    verification_codes::Column::SessionId,
                    verification_codes::Column::ClaimantId,
                ])
                .update_columns([
                    verification_codes::Column::Id,
                    verification_codes::Column::SessionCodeId,
                    verification_codes::Column::Contact,
                    verification_codes::Column::Code,
                    verification_codes::Column::Attempts,
                    verification_codes::Column::ExpiresAt,
                    verification_codes::Column::Verified,
                    verification_codes::Column::VerifiedAt,
                    verification_codes::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .context("replace verification code")?;
        Ok(())
    }

    async fn save_progress(&self, code: &VerificationCode) -> Result<(), AttendanceServiceError> {
        verification_codes::ActiveModel {
            id: Set(code.id),
            attempts: Set(code.attempts),
            verified: Set(code.verified),
            verified_at: Set(code.verified_at),
            ..Default::default()
        }
        .update(self.db.as_ref())
        .await
        .context("save verification progress")?;
        Ok(())
    }
}

fn verification_code_from_model(model: verification_codes::Model) -> VerificationCode {
    VerificationCode {
        id: model.id,
        session_id: model.session_id,
        claimant_id: model.claimant_id,
        session_code_id: model.session_code_id,
        contact: model.contact,
        code: model.code,
        attempts: model.attempts,
        expires_at: model.expires_at,
        verified: model.verified,
        verified_at: model.verified_at,
        created_at: model.created_at,
    }
}

// ── Attendance repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAttendanceRepository {
    pub db: Arc<DatabaseConnection>,
}

impl AttendanceRepository for DbAttendanceRepository {
    async fn insert_if_absent(
        &self,
        record: &AttendanceRecord,
    ) -> Result<(AttendanceRecord, bool), AttendanceServiceError> {
        let model = attendance_records::ActiveModel {
            session_id: Set(record.session_id),
            claimant_id: Set(record.claimant_id),
            status: Set(record.status.as_str().to_owned()),
            marked_at: Set(record.marked_at),
            session_code_id: Set(record.session_code_id),
            verification_code_id: Set(record.verification_code_id),
        };
        let inserted = attendance_records::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    attendance_records::Column::SessionId,
                    attendance_records::Column::ClaimantId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .context("insert attendance record")?;

        let stored = attendance_records::Entity::find_by_id((record.session_id, record.claimant_id))
            .one(self.db.as_ref())
            .await
            .context("read back attendance record")?
            .ok_or(AttendanceServiceError::PersistenceConflict)?;
        Ok((attendance_from_model(stored)?, inserted == 1))
    }

    async fn list_by_claimant(
        &self,
        claimant_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        let models = attendance_records::Entity::find()
            .filter(attendance_records::Column::ClaimantId.eq(claimant_id))
            .order_by_desc(attendance_records::Column::MarkedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .context("list attendance by claimant")?;
        models.into_iter().map(attendance_from_model).collect()
    }

    async fn list_by_session(
        &self,
        session_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        let models = attendance_records::Entity::find()
            .filter(attendance_records::Column::SessionId.eq(session_id))
            .order_by_asc(attendance_records::Column::MarkedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .context("list attendance by session")?;
        models.into_iter().map(attendance_from_model).collect()
    }
}

fn attendance_from_model(
    model: attendance_records::Model,
) -> Result<AttendanceRecord, AttendanceServiceError> {
    let status = model
        .status
        .parse::<AttendanceStatus>()
        .context("decode attendance status")?;
    Ok(AttendanceRecord {
        session_id: model.session_id,
        claimant_id: model.claimant_id,
        status,
        marked_at: model.marked_at,
        session_code_id: model.session_code_id,
        verification_code_id: model.verification_code_id,
    })
}
