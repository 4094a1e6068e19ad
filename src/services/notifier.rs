//! Outbound notification delivery.
//!
//! The transport (which chat platform, which gateway) is a collaborator
//! behind the `NotificationTransport` trait; this module owns the delivery
//! policy: bounded retry on transient transport failure, and the benign
//! "content unchanged" outcome of an edit is success, not an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::services::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Transient-External: network/timeout failure
    #[error("transport request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Transport answered with an error status
    #[error("transport rejected the message: {0}")]
    Rejected(String),
    /// Edit targeted a message whose content already matches — a no-op
    #[error("message content unchanged")]
    NotModified,
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        // Rejections are retried too: rate limits and flood control show
        // up as error statuses and usually clear within the retry window.
        !matches!(self, TransportError::NotModified)
    }
}

/// Capability point for send-new and edit-existing message delivery
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send_message(&self, subscriber_id: i64, text: &str) -> Result<(), TransportError>;

    async fn edit_message(
        &self,
        subscriber_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError>;
}

/// Push gateway implementation: a JSON POST per message. The gateway maps
/// subscriber ids to the actual chat transport.
#[derive(Clone)]
pub struct PushGatewayClient {
    client: Client,
    base_url: String,
}

impl PushGatewayClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(
                crate::services::price_source::REQUEST_TIMEOUT_SECS,
            ))
            .build()?;
        Ok(Self { client, base_url })
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // The gateway reports an unchanged edit as a conflict
            StatusCode::CONFLICT => Err(TransportError::NotModified),
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(TransportError::Rejected(format!("{}: {}", status, detail)))
            }
        }
    }
}

#[async_trait]
impl NotificationTransport for PushGatewayClient {
    async fn send_message(&self, subscriber_id: i64, text: &str) -> Result<(), TransportError> {
        self.post(
            "/send",
            json!({ "subscriberId": subscriber_id, "text": text }),
        )
        .await
    }

    async fn edit_message(
        &self,
        subscriber_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        self.post(
            "/edit",
            json!({ "subscriberId": subscriber_id, "messageId": message_id, "text": text }),
        )
        .await
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn NotificationTransport>,
    retry: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Sends a new message, retrying transient failures. Exhaustion
    /// surfaces the last error; the caller logs and moves on.
    pub async fn deliver(&self, subscriber_id: i64, text: &str) -> Result<(), TransportError> {
        self.retry
            .run(
                || self.transport.send_message(subscriber_id, text),
                TransportError::is_transient,
            )
            .await
    }

    /// Edits an existing message. An unchanged-content response is a
    /// successful no-op.
    pub async fn amend(
        &self,
        subscriber_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        let result = self
            .retry
            .run(
                || self.transport.edit_message(subscriber_id, message_id, text),
                TransportError::is_transient,
            )
            .await;

        match result {
            Err(TransportError::NotModified) => Ok(()),
            other => other,
        }
    }
}
