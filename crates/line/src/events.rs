use serde::Deserialize;
use thiserror::Error;

/// Opaque per-event handle addressing the one permitted reply.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ReplyToken(pub String);

impl ReplyToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One webhook event, as a closed union. Unknown event kinds decode to
/// `Other` so a provider schema addition never fails the whole envelope.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    Message { reply_token: ReplyToken, message: MessageContent },
    #[serde(rename_all = "camelCase")]
    Follow { reply_token: ReplyToken },
    Unfollow,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
    Image,
    #[serde(other)]
    Other,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed webhook envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(default)]
    events: Vec<Event>,
}

/// Decodes the raw webhook body into events, preserving arrival order.
///
/// Only structural failures (the body is not a valid envelope) error out;
/// unrecognized event or message kinds come back as `Other` variants.
pub fn parse(body: &[u8]) -> Result<Vec<Event>, ParseError> {
    let envelope = serde_json::from_slice::<WebhookEnvelope>(body)?;
    Ok(envelope.events)
}
