//! LINE Messaging API integration - webhook protocol core
//!
//! This crate implements the provider-facing protocol for wardline:
//! - **Signature** (`signature`) - HMAC-SHA256 verification of inbound webhooks
//! - **Events** (`events`) - envelope parsing into a closed `Event` union
//! - **Dispatch** (`dispatch`) - in-order routing of events to handlers
//! - **Handler** (`handler`) - text-message handling: lookup + reply
//! - **Flex** (`flex`) - patient card builders (LINE Flex Message JSON)
//! - **Client** (`client`) - reply delivery over the Messaging API
//!
//! # Architecture
//!
//! ```text
//! POST /webhook/line → verify signature → parse envelope
//!          ↓
//!    EventDispatcher → MessageHandler → PatientLookup
//!          ↓                                ↓
//!       no-op branches              ReplySender ← flex card
//! ```
//!
//! The webhook HTTP status is decided before any handler runs: a request
//! that fails signature verification is rejected with 400 and a request
//! whose envelope does not parse yields 500. Everything downstream of a
//! verified, parsed request is contained and the endpoint answers 200.

pub mod client;
pub mod dispatch;
pub mod events;
pub mod flex;
pub mod handler;
pub mod signature;

pub use client::LineClient;
pub use dispatch::{EventContext, EventDispatcher};
pub use events::{parse, Event, MessageContent, ParseError, ReplyToken};
pub use handler::{
    HandlerOutcome, LookupError, MessageHandler, OutgoingMessage, PatientLookup, ReplySender,
    SendError,
};
pub use signature::verify_signature;
