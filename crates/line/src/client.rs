use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::events::ReplyToken;
use crate::handler::{OutgoingMessage, ReplySender, SendError};

/// Messaging API reply client. One POST per reply token; the platform
/// permits a single reply per inbound event, so `messages` always carries
/// exactly one entry here.
pub struct LineClient {
    http: reqwest::Client,
    reply_url: String,
    channel_access_token: SecretString,
}

impl LineClient {
    pub fn new(reply_url: impl Into<String>, channel_access_token: SecretString) -> Self {
        Self { http: reqwest::Client::new(), reply_url: reply_url.into(), channel_access_token }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [&'a OutgoingMessage; 1],
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(
        &self,
        reply_token: &ReplyToken,
        message: OutgoingMessage,
    ) -> Result<(), SendError> {
        let request = ReplyRequest { reply_token: reply_token.as_str(), messages: [&message] };

        let response = self
            .http
            .post(&self.reply_url)
            .bearer_auth(self.channel_access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| SendError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail =
                response.text().await.unwrap_or_else(|_| "<unreadable response body>".to_string());
            return Err(SendError::Api { status: status.as_u16(), detail });
        }

        debug!(
            event_name = "line.reply.sent",
            status = status.as_u16(),
            "reply accepted by messaging api"
        );
        Ok(())
    }
}
