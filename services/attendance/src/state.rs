use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAttendanceRepository, DbClassSessionRepository, DbProfileRepository,
    DbSessionCodeRepository, DbVerificationCodeRepository,
};
use crate::infra::delivery::ConfiguredDelivery;
use crate::locks::PairLocks;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub delivery: ConfiguredDelivery,
    /// Shared by every request so issue and verify for one pair exclude each other.
    pub locks: PairLocks,
    pub delivery_timeout: Duration,
    pub store_timeout: Duration,
    pub late_grace: chrono::Duration,
}

impl AppState {
    pub fn class_session_repo(&self) -> DbClassSessionRepository {
        DbClassSessionRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn session_code_repo(&self) -> DbSessionCodeRepository {
        DbSessionCodeRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn verification_code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn attendance_repo(&self) -> DbAttendanceRepository {
        DbAttendanceRepository {
            db: Arc::clone(&self.db),
        }
    }
}
