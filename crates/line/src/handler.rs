use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use wardline_core::domain::patient::PatientRecord;

use crate::dispatch::EventContext;
use crate::events::ReplyToken;
use crate::flex::{patient_bubble, FlexContainer};

/// Reply sent when the lookup finds no patient with the given name.
pub const NOT_FOUND_REPLY: &str =
    "No patient record matched that name. Please check the spelling and try again.";

/// Reply sent when the lookup itself failed (store unreachable, timeout).
pub const RETRY_REPLY: &str =
    "Something went wrong while looking up patient records. Please try again shortly.";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("patient lookup failed: {0}")]
    Backend(String),
    #[error("patient lookup timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("reply api rejected the message: status {status}, {detail}")]
    Api { status: u16, detail: String },
    #[error("reply transport failed: {0}")]
    Transport(String),
}

/// Outbound reply payload, serialized into the Messaging API `messages`
/// array. `Flex` carries the rendered patient card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    Flex { alt_text: String, contents: FlexContainer },
}

#[async_trait]
pub trait PatientLookup: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, LookupError>;
}

#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(
        &self,
        reply_token: &ReplyToken,
        message: OutgoingMessage,
    ) -> Result<(), SendError>;
}

/// What one text-message invocation amounted to. Informational only: the
/// webhook status is already decided by the time any handler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    RepliedCard,
    RepliedNotFound,
    RepliedRetry,
    ReplyFailed,
}

/// Stateless per-event transaction: trim the text, resolve it as a patient
/// name, reply with a card, a not-found text, or a retry text. Lookup and
/// reply-send are each bounded by `call_timeout`. Nothing here escapes as
/// an error; faults are logged and degraded to a textual reply.
pub struct MessageHandler {
    lookup: Arc<dyn PatientLookup>,
    sender: Arc<dyn ReplySender>,
    call_timeout: Duration,
}

impl MessageHandler {
    pub fn new(
        lookup: Arc<dyn PatientLookup>,
        sender: Arc<dyn ReplySender>,
        call_timeout: Duration,
    ) -> Self {
        Self { lookup, sender, call_timeout }
    }

    pub async fn handle_text(
        &self,
        text: &str,
        reply_token: &ReplyToken,
        ctx: &EventContext,
    ) -> HandlerOutcome {
        // Empty-after-trim is still a valid lookup key, just one that will
        // not match anything.
        let name = text.trim();

        let lookup_result =
            match tokio::time::timeout(self.call_timeout, self.lookup.find_by_name(name)).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout(self.call_timeout)),
            };

        let (message, outcome) = match lookup_result {
            Ok(Some(record)) => {
                info!(
                    event_name = "webhook.lookup.found",
                    correlation_id = %ctx.correlation_id,
                    patient = %record.full_name,
                    "patient record found"
                );
                let alt_text = format!("Patient record: {}", record.full_name);
                (
                    OutgoingMessage::Flex { alt_text, contents: patient_bubble(&record) },
                    HandlerOutcome::RepliedCard,
                )
            }
            Ok(None) => {
                info!(
                    event_name = "webhook.lookup.not_found",
                    correlation_id = %ctx.correlation_id,
                    "no patient record matched"
                );
                (
                    OutgoingMessage::Text { text: NOT_FOUND_REPLY.to_string() },
                    HandlerOutcome::RepliedNotFound,
                )
            }
            Err(cause) => {
                warn!(
                    event_name = "webhook.lookup.error",
                    correlation_id = %ctx.correlation_id,
                    error = %cause,
                    "patient lookup failed, replying with retry text"
                );
                (
                    OutgoingMessage::Text { text: RETRY_REPLY.to_string() },
                    HandlerOutcome::RepliedRetry,
                )
            }
        };

        match tokio::time::timeout(self.call_timeout, self.sender.send_reply(reply_token, message))
            .await
        {
            Ok(Ok(())) => outcome,
            Ok(Err(error)) => {
                warn!(
                    event_name = "webhook.reply.send_failed",
                    correlation_id = %ctx.correlation_id,
                    error = %error,
                    "reply delivery failed"
                );
                HandlerOutcome::ReplyFailed
            }
            Err(_) => {
                warn!(
                    event_name = "webhook.reply.send_timeout",
                    correlation_id = %ctx.correlation_id,
                    timeout_secs = self.call_timeout.as_secs(),
                    "reply delivery timed out"
                );
                HandlerOutcome::ReplyFailed
            }
        }
    }
}
