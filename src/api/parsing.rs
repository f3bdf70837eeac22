//! Inbound request parsing: verification-handshake query strings and the
//! webhook event envelope.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::models::Message;
use crate::errors::BotError;

/// Decodes a URL-encoded string using the percent_encoding crate.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    percent_decode_str(input)
        .decode_utf8()
        .map(|s| s.replace('+', " "))
        .map_err(|e| format!("Failed to decode URL component: {}", e))
        .map(|s| s.to_string())
}

/// Parses a raw query string (`hub.mode=subscribe&hub.challenge=...`) into a
/// key/value map, percent-decoding both sides.
pub fn parse_query_string(query: &str) -> Result<HashMap<String, String>, BotError> {
    let mut map: HashMap<String, String> = HashMap::new();

    for pair in query.split('&') {
        if let Some(idx) = pair.find('=') {
            let key = decode_url_component(&pair[..idx])
                .map_err(|e| BotError::Parse(format!("Failed to decode key: {}", e)))?;
            let value = decode_url_component(&pair[idx + 1..])
                .map_err(|e| BotError::Parse(format!("Failed to decode value: {}", e)))?;
            map.insert(key, value);
        }
    }

    Ok(map)
}

/// Case-insensitive header lookup on a lambda proxy `headers` object.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

// ============================================================================
// Webhook envelope
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    object: String,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
struct MessagingEvent {
    sender: Party,
    recipient: Option<Party>,
    message: Option<InboundMessage>,
    postback: Option<Postback>,
}

#[derive(Debug, Deserialize)]
struct Party {
    id: String,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    text: Option<String>,
    quick_reply: Option<QuickReply>,
    #[serde(default)]
    is_echo: bool,
}

#[derive(Debug, Deserialize)]
struct QuickReply {
    payload: String,
}

#[derive(Debug, Deserialize)]
struct Postback {
    payload: String,
}

/// Parse a `POST /` event envelope into normalized [`Message`]s.
///
/// Echo events (the page's own outbound messages reflected back) and
/// delivery/read receipts produce no `Message`.
///
/// # Errors
///
/// Returns [`BotError::Parse`] if the body is not a page event envelope.
pub fn parse_envelope(body: &str) -> Result<Vec<Message>, BotError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| BotError::Parse(format!("Invalid envelope JSON: {}", e)))?;

    if envelope.object != "page" {
        return Err(BotError::Parse(format!(
            "Unexpected envelope object: {}",
            envelope.object
        )));
    }

    let mut messages = Vec::new();
    for entry in envelope.entry {
        for event in entry.messaging {
            if let Some(message) = normalize_event(event) {
                messages.push(message);
            }
        }
    }

    Ok(messages)
}

fn normalize_event(event: MessagingEvent) -> Option<Message> {
    let recipient_id = event.recipient.map(|r| r.id);

    if let Some(postback) = event.postback {
        return Some(Message {
            sender_id: event.sender.id,
            recipient_id,
            text: None,
            payload: Some(postback.payload),
        });
    }

    let inbound = event.message?;
    if inbound.is_echo {
        return None;
    }

    let payload = inbound.quick_reply.map(|q| q.payload);
    if inbound.text.is_none() && payload.is_none() {
        // Attachment-only events carry nothing the state machine can use.
        return None;
    }

    Some(Message {
        sender_id: event.sender.id,
        recipient_id,
        text: inbound.text,
        payload,
    })
}
