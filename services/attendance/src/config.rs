use std::time::Duration;

use serde::{Deserialize, Deserializer, de::Error as _};

use campus_core::config::Config;

/// Attendance service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3114). Env var: `ATTENDANCE_PORT`.
    #[serde(default = "default_port")]
    pub attendance_port: u16,
    /// Mailer endpoint receiving verification codes. Codes are only logged when unset.
    #[serde(default)]
    pub delivery_webhook_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub delivery_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub store_timeout_ms: u64,
    /// How long after a session starts a check-in still counts as present.
    /// Env var: `LATE_GRACE_SECS`, in whole seconds.
    #[serde(
        rename = "late_grace_secs",
        default = "default_late_grace",
        deserialize_with = "late_grace_from_secs"
    )]
    pub late_grace: chrono::Duration,
}

fn default_port() -> u16 {
    3114
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_late_grace() -> chrono::Duration {
    chrono::Duration::minutes(15)
}

fn late_grace_from_secs<'de, D>(deserializer: D) -> Result<chrono::Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    if secs < 0 {
        return Err(D::Error::custom(format!(
            "LATE_GRACE_SECS must not be negative, got {secs}"
        )));
    }
    chrono::Duration::try_seconds(secs)
        .ok_or_else(|| D::Error::custom(format!("LATE_GRACE_SECS is out of range: {secs}")))
}

impl Config for AttendanceConfig {}

impl AttendanceConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
