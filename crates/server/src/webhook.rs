use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn};
use uuid::Uuid;

use wardline_line::dispatch::{EventContext, EventDispatcher};
use wardline_line::events::parse;
use wardline_line::signature::verify_signature;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Clone)]
pub struct WebhookState {
    channel_secret: SecretString,
    dispatcher: Arc<EventDispatcher>,
}

impl WebhookState {
    pub fn new(channel_secret: SecretString, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { channel_secret, dispatcher }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/webhook/line", post(receive_webhook)).with_state(state)
}

/// The single webhook entry point. The body is buffered exactly once and
/// both signature verification and parsing run over those same bytes.
/// Status is decided in order: bad signature 400, malformed envelope 500,
/// otherwise 200 after every event in the batch has been dispatched.
async fn receive_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let correlation_id = Uuid::new_v4().to_string();

    let signature =
        headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok()).unwrap_or_default();

    if !verify_signature(state.channel_secret.expose_secret(), &body, signature) {
        warn!(
            event_name = "webhook.signature.invalid",
            correlation_id = %correlation_id,
            "rejected webhook call with missing or invalid signature"
        );
        return StatusCode::BAD_REQUEST;
    }

    let events = match parse(&body) {
        Ok(events) => events,
        Err(parse_error) => {
            error!(
                event_name = "webhook.envelope.malformed",
                correlation_id = %correlation_id,
                error = %parse_error,
                "signed webhook body did not parse as an event envelope"
            );
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    info!(
        event_name = "webhook.request.accepted",
        correlation_id = %correlation_id,
        event_count = events.len(),
        "webhook request verified and parsed"
    );

    let ctx = EventContext { correlation_id };
    state.dispatcher.dispatch_all(events, &ctx).await;

    StatusCode::OK
}
