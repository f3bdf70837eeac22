//! Matching an inbound message against a set of presented options.

use crate::core::models::{Message, PayloadOption};
use crate::errors::BotError;

/// Find which presented option, if any, the message selects.
///
/// A payload click (button or quick reply) wins over free text when both
/// are present in one event; a payload that matches no presented token is
/// a [`BotError::MalformedOption`]. Free text matches case-insensitively
/// against the short payload token and the literal button title, first by
/// equality, then by containment; unmatched free text is simply `None`.
pub fn match_option<'a>(
    options: &'a [PayloadOption],
    message: &Message,
) -> Result<Option<&'a PayloadOption>, BotError> {
    if let Some(payload) = &message.payload {
        return options
            .iter()
            .find(|o| o.token.eq_ignore_ascii_case(payload))
            .map(Some)
            .ok_or_else(|| BotError::MalformedOption(payload.clone()));
    }

    let Some(text) = message.text.as_deref() else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Some(exact) = options
        .iter()
        .find(|o| o.token.eq_ignore_ascii_case(text) || o.title.eq_ignore_ascii_case(text))
    {
        return Ok(Some(exact));
    }

    let lowered = text.to_lowercase();
    Ok(options.iter().find(|o| {
        lowered.contains(&o.token.to_lowercase()) || lowered.contains(&o.title.to_lowercase())
    }))
}

/// The reserved cancel gesture, honored anywhere inside a nested flow.
#[must_use]
pub fn is_cancel(message: &Message) -> bool {
    if message
        .payload
        .as_deref()
        .is_some_and(|p| p.eq_ignore_ascii_case("CANCEL"))
    {
        return true;
    }
    message.text.as_deref().is_some_and(|t| {
        let t = t.trim();
        t.eq_ignore_ascii_case("cancel")
            || t.eq_ignore_ascii_case("quit")
            || t.eq_ignore_ascii_case("nevermind")
    })
}

/// The reserved back gesture for stepping one position back in a flow.
#[must_use]
pub fn is_back(message: &Message) -> bool {
    if message
        .payload
        .as_deref()
        .is_some_and(|p| p.eq_ignore_ascii_case("BACK"))
    {
        return true;
    }
    message
        .text
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("back"))
}

/// Trimmed free text, if the message carries any.
#[must_use]
pub fn text_of(message: &Message) -> Option<&str> {
    let text = message.text.as_deref()?.trim();
    if text.is_empty() { None } else { Some(text) }
}
