//! Notification Module
//!
//! 邮件通过 HTTP 中继发送。发信永远不阻塞也不失败业务请求，
//! 失败只记日志 (下单成功但邮件失败是可接受的)。

pub mod messages;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::utils::{AppError, AppResult};

/// One outbound email
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound notification boundary
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// Posts messages to an HTTP mail relay
pub struct RelayNotifier {
    client: reqwest::Client,
    relay_url: String,
}

impl RelayNotifier {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: relay_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Mail relay unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Mail relay rejected message: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Logs instead of sending (no relay configured, tests)
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        tracing::info!("Email suppressed (no relay): to={} subject={}", message.to, message.subject);
        Ok(())
    }
}

/// Fire-and-forget send; failures are logged, never propagated
pub fn send_in_background(notifier: Arc<dyn Notifier>, message: EmailMessage) {
    tokio::spawn(async move {
        let subject = message.subject.clone();
        if let Err(e) = notifier.send(message).await {
            tracing::warn!("Email delivery failed ({subject}): {e}");
        }
    });
}
