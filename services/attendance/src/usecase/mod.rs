use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AttendanceServiceError;

pub mod attendance;
pub mod challenge;
pub mod check_in;
pub mod codegen;
pub mod session_code;

/// Await a repository call for at most `limit`; a stall becomes `StoreTimeout`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, AttendanceServiceError>>,
) -> Result<T, AttendanceServiceError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "store call timed out"
            );
            Err(AttendanceServiceError::StoreTimeout)
        }
    }
}
