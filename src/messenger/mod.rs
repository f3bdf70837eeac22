//! Outbound side of the messenger adapter.

pub mod client;
pub mod payload_builder;

pub use client::{MessengerClient, OutboundSender};
pub use payload_builder::{
    MAX_BUTTONS_PER_MESSAGE, MAX_QUICK_REPLIES, build_button_payload, build_quick_reply_payload,
    build_text_payload, outbound_payloads,
};
