//! Send API payload builders, extracted as pure functions for testability.

use serde_json::{Value, json};
use tracing::warn;

use crate::core::models::{PayloadOption, Reply};

/// The provider caps button templates at three buttons; longer option
/// lists split into successive messages.
pub const MAX_BUTTONS_PER_MESSAGE: usize = 3;

/// The provider caps quick replies; overflow is truncated.
pub const MAX_QUICK_REPLIES: usize = 11;

const CONTINUATION_TEXT: &str = "More options:";

/// Build the JSON payload for a plain text message.
#[must_use]
pub fn build_text_payload(recipient_id: &str, text: &str) -> Value {
    json!({
        "recipient": { "id": recipient_id },
        "message": { "text": text }
    })
}

/// Build the JSON payload for a button-template message.
#[must_use]
pub fn build_button_payload(recipient_id: &str, text: &str, options: &[PayloadOption]) -> Value {
    let buttons: Vec<Value> = options
        .iter()
        .map(|o| {
            json!({
                "type": "postback",
                "title": o.title,
                "payload": o.token
            })
        })
        .collect();

    json!({
        "recipient": { "id": recipient_id },
        "message": {
            "attachment": {
                "type": "template",
                "payload": {
                    "template_type": "button",
                    "text": text,
                    "buttons": buttons
                }
            }
        }
    })
}

/// Build the JSON payload for a text message carrying quick replies.
#[must_use]
pub fn build_quick_reply_payload(
    recipient_id: &str,
    text: &str,
    options: &[PayloadOption],
) -> Value {
    let quick_replies: Vec<Value> = options
        .iter()
        .map(|o| {
            json!({
                "content_type": "text",
                "title": o.title,
                "payload": o.token
            })
        })
        .collect();

    json!({
        "recipient": { "id": recipient_id },
        "message": {
            "text": text,
            "quick_replies": quick_replies
        }
    })
}

/// Render one normalized reply into the provider messages to deliver, in
/// order, obeying the provider's fan-out limits.
#[must_use]
pub fn outbound_payloads(recipient_id: &str, reply: &Reply) -> Vec<Value> {
    let Some(payload) = &reply.payload else {
        return vec![build_text_payload(recipient_id, &reply.text)];
    };
    if payload.options.is_empty() {
        return vec![build_text_payload(recipient_id, &reply.text)];
    }

    if payload.quick_reply {
        let mut options = payload.options.as_slice();
        if options.len() > MAX_QUICK_REPLIES {
            warn!(
                count = options.len(),
                "Too many quick replies, truncating to {MAX_QUICK_REPLIES}"
            );
            options = &options[..MAX_QUICK_REPLIES];
        }
        return vec![build_quick_reply_payload(recipient_id, &reply.text, options)];
    }

    payload
        .options
        .chunks(MAX_BUTTONS_PER_MESSAGE)
        .enumerate()
        .map(|(i, chunk)| {
            let text = if i == 0 {
                reply.text.as_str()
            } else {
                CONTINUATION_TEXT
            };
            build_button_payload(recipient_id, text, chunk)
        })
        .collect()
}
