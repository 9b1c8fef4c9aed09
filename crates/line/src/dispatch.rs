use tracing::debug;

use crate::events::{Event, MessageContent};
use crate::handler::MessageHandler;

/// Per-request context threaded through handler logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// Routes parsed events, strictly in arrival order and one at a time.
///
/// Only Message/Text events reach the `MessageHandler`. Every other kind
/// lands in an explicit no-op branch that leaves a trace, so extension
/// points stay discoverable and nothing is dropped silently. A handler
/// outcome never interrupts the rest of the batch.
pub struct EventDispatcher {
    handler: MessageHandler,
}

impl EventDispatcher {
    pub fn new(handler: MessageHandler) -> Self {
        Self { handler }
    }

    pub async fn dispatch_all(&self, events: Vec<Event>, ctx: &EventContext) {
        for event in events {
            self.dispatch(event, ctx).await;
        }
    }

    async fn dispatch(&self, event: Event, ctx: &EventContext) {
        match event {
            Event::Message { reply_token, message: MessageContent::Text { text } } => {
                let outcome = self.handler.handle_text(&text, &reply_token, ctx).await;
                debug!(
                    event_name = "webhook.dispatch.text_message",
                    correlation_id = %ctx.correlation_id,
                    outcome = ?outcome,
                    "text message handled"
                );
            }
            Event::Message { .. } => {
                debug!(
                    event_name = "webhook.dispatch.non_text_message",
                    correlation_id = %ctx.correlation_id,
                    "non-text message received, no handler registered"
                );
            }
            Event::Follow { .. } => {
                debug!(
                    event_name = "webhook.dispatch.follow",
                    correlation_id = %ctx.correlation_id,
                    "follow event received, no handler registered"
                );
            }
            Event::Unfollow => {
                debug!(
                    event_name = "webhook.dispatch.unfollow",
                    correlation_id = %ctx.correlation_id,
                    "unfollow event received, no handler registered"
                );
            }
            Event::Other => {
                debug!(
                    event_name = "webhook.dispatch.unknown",
                    correlation_id = %ctx.correlation_id,
                    "unrecognized event kind received, ignoring"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use wardline_core::domain::patient::PatientRecord;

    use super::{EventContext, EventDispatcher};
    use crate::events::{Event, MessageContent, ReplyToken};
    use crate::handler::{
        LookupError, MessageHandler, OutgoingMessage, PatientLookup, ReplySender, SendError,
    };

    #[derive(Default)]
    struct RecordingLookup {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PatientLookup for RecordingLookup {
        async fn find_by_name(&self, name: &str) -> Result<Option<PatientRecord>, LookupError> {
            self.calls.lock().await.push(name.to_string());
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CountingSender {
        sent: Mutex<Vec<ReplyToken>>,
    }

    #[async_trait]
    impl ReplySender for CountingSender {
        async fn send_reply(
            &self,
            reply_token: &ReplyToken,
            _message: OutgoingMessage,
        ) -> Result<(), SendError> {
            self.sent.lock().await.push(reply_token.clone());
            Ok(())
        }
    }

    fn text_event(token: &str, text: &str) -> Event {
        Event::Message {
            reply_token: ReplyToken(token.to_string()),
            message: MessageContent::Text { text: text.to_string() },
        }
    }

    fn dispatcher(lookup: Arc<RecordingLookup>, sender: Arc<CountingSender>) -> EventDispatcher {
        EventDispatcher::new(MessageHandler::new(lookup, sender, Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn handles_text_events_in_arrival_order() {
        let lookup = Arc::new(RecordingLookup::default());
        let sender = Arc::new(CountingSender::default());
        let ctx = EventContext::default();

        dispatcher(lookup.clone(), sender)
            .dispatch_all(
                vec![text_event("a", "A"), text_event("b", "B"), text_event("c", "C")],
                &ctx,
            )
            .await;

        assert_eq!(
            *lookup.calls.lock().await,
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
    }

    #[tokio::test]
    async fn non_text_events_are_no_ops() {
        let lookup = Arc::new(RecordingLookup::default());
        let sender = Arc::new(CountingSender::default());
        let ctx = EventContext::default();

        dispatcher(lookup.clone(), sender.clone())
            .dispatch_all(
                vec![
                    Event::Follow { reply_token: ReplyToken("f".to_string()) },
                    Event::Unfollow,
                    Event::Other,
                    Event::Message {
                        reply_token: ReplyToken("i".to_string()),
                        message: MessageContent::Image,
                    },
                ],
                &ctx,
            )
            .await;

        assert!(lookup.calls.lock().await.is_empty());
        assert!(sender.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn text_events_after_a_no_op_are_still_handled() {
        let lookup = Arc::new(RecordingLookup::default());
        let sender = Arc::new(CountingSender::default());
        let ctx = EventContext::default();

        dispatcher(lookup.clone(), sender)
            .dispatch_all(vec![Event::Other, text_event("z", "Zelda")], &ctx)
            .await;

        assert_eq!(*lookup.calls.lock().await, vec!["Zelda".to_string()]);
    }
}
