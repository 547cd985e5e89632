use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Attendance service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceServiceError {
    #[error("invalid validity window")]
    InvalidWindow,
    #[error("unknown code")]
    UnknownCode,
    #[error("code expired")]
    ExpiredCode,
    #[error("code revoked")]
    RevokedCode,
    #[error("code mismatch")]
    Mismatch,
    #[error("verification attempts exhausted")]
    AttemptsExhausted,
    #[error("verification code delivery failed")]
    DeliveryFailure,
    #[error("attendance record conflict")]
    PersistenceConflict,
    #[error("class session not found")]
    SessionNotFound,
    #[error("claimant not found")]
    ClaimantNotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("attendance already verified")]
    AlreadyVerified,
    #[error("store timed out")]
    StoreTimeout,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AttendanceServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidWindow => "INVALID_WINDOW",
            Self::UnknownCode => "UNKNOWN_CODE",
            Self::ExpiredCode => "EXPIRED_CODE",
            Self::RevokedCode => "REVOKED_CODE",
            Self::Mismatch => "MISMATCH",
            Self::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
            Self::DeliveryFailure => "DELIVERY_FAILURE",
            Self::PersistenceConflict => "PERSISTENCE_CONFLICT",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::ClaimantNotFound => "CLAIMANT_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether repeating the same request can succeed. Expired or exhausted codes
    /// need a fresh issue instead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Mismatch | Self::DeliveryFailure | Self::StoreTimeout)
    }
}

impl IntoResponse for AttendanceServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidWindow => StatusCode::BAD_REQUEST,
            Self::UnknownCode | Self::SessionNotFound | Self::ClaimantNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ExpiredCode | Self::RevokedCode => StatusCode::GONE,
            Self::Mismatch => StatusCode::UNAUTHORIZED,
            Self::AttemptsExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyVerified | Self::PersistenceConflict => StatusCode::CONFLICT,
            Self::DeliveryFailure | Self::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records method/uri/status; only 500s carry a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });
        (status, axum::Json(body)).into_response()
    }
}
