//! Contact-delivery adapters for verification codes.

use tracing::{info, warn};

use crate::domain::repository::ContactDelivery;
use crate::domain::types::CodeMessage;
use crate::error::AttendanceServiceError;

/// POSTs each message as JSON to an external mailer.
#[derive(Clone)]
pub struct WebhookDelivery {
    http: reqwest::Client,
    url: String,
}

impl WebhookDelivery {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ContactDelivery for WebhookDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<(), AttendanceServiceError> {
        let response = self
            .http
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "delivery webhook request failed");
                AttendanceServiceError::DeliveryFailure
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "delivery webhook rejected message");
            return Err(AttendanceServiceError::DeliveryFailure);
        }
        Ok(())
    }
}

/// Writes codes to the log instead of sending them. Local development only.
#[derive(Debug, Clone, Default)]
pub struct LogDelivery;

impl ContactDelivery for LogDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<(), AttendanceServiceError> {
        info!(
            address = %message.address,
            code = %message.code,
            subject = %message.subject,
            expires_at = %message.expires_at,
            "verification code (log delivery)"
        );
        Ok(())
    }
}

/// Delivery picked at startup from `DELIVERY_WEBHOOK_URL`.
#[derive(Clone)]
pub enum ConfiguredDelivery {
    Webhook(WebhookDelivery),
    Log(LogDelivery),
}

impl ConfiguredDelivery {
    pub fn from_webhook_url(url: Option<&str>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Webhook(WebhookDelivery::new(url.trim())),
            _ => Self::Log(LogDelivery),
        }
    }
}

impl ContactDelivery for ConfiguredDelivery {
    async fn deliver(&self, message: &CodeMessage) -> Result<(), AttendanceServiceError> {
        match self {
            Self::Webhook(d) => d.deliver(message).await,
            Self::Log(d) => d.deliver(message).await,
        }
    }
}
