//! API Lambda handler - thin router over the webhook contract.
//!
//! This module handles:
//! - The `GET /` verification handshake (shared verify token)
//! - `POST /` event envelopes (signature check, parse, dispatch)
//! - The top-level catch-all: dispatch failures are logged and swallowed so
//!   the provider always gets its 200 once the signature checks out

use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use super::{helpers, parsing, signature};
use crate::actions::{BotContext, Dispatcher};
use crate::core::config::AppConfig;
use crate::messenger::MessengerClient;
use crate::platform::PlatformClient;
use crate::store::SsmPlayerStore;

pub use self::function_handler as handler;

const DEFAULT_LEAGUE_TIMEZONE: chrono_tz::Tz = chrono_tz::America::Toronto;

/// Lambda handler for the webhook entrypoint.
///
/// # Errors
///
/// Returns an error response payload if the request is malformed or fails
/// signature verification; otherwise returns a 200 with an empty body.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;

    // ========================================================================
    // Verification handshake (GET)
    // ========================================================================

    if http_method(&event.payload).eq_ignore_ascii_case("GET") {
        return Ok(handle_verification(&config, &event.payload));
    }

    // ========================================================================
    // Signed event envelope (POST)
    // ========================================================================

    let Some(headers) = event.payload.get("headers") else {
        error!("Request missing headers");
        return Ok(helpers::err_response(400, "Missing headers"));
    };

    let body = match extract_body(&event.payload) {
        Ok(b) => b,
        Err(response) => return Ok(response),
    };

    if let Err(response) = verify_signature(&body, headers, &config) {
        return Ok(response);
    }

    let messages = match parsing::parse_envelope(&body) {
        Ok(messages) => messages,
        Err(e) => {
            error!("Failed to parse event envelope: {}", e);
            return Ok(helpers::err_response(400, &format!("Parse Error: {e}")));
        }
    };
    info!(count = messages.len(), "Webhook envelope parsed");

    // ========================================================================
    // Dispatch
    // ========================================================================

    let tz = config
        .league_timezone
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(DEFAULT_LEAGUE_TIMEZONE);

    let ctx = BotContext {
        platform: Arc::new(PlatformClient::new(&config)),
        store: Arc::new(SsmPlayerStore::new(&config.player_param_prefix)),
        tz,
    };
    let dispatcher = Dispatcher::new(ctx, Arc::new(MessengerClient::new(&config)));

    for message in &messages {
        // Catch-all: a failed dispatch leaves that sender without a reply,
        // but the provider still gets its 200 and stops re-delivering.
        if let Err(e) = dispatcher.dispatch(message).await {
            error!(sender_id = %message.sender_id, "Dispatch failed: {}", e);
        }
    }

    Ok(helpers::ok_empty())
}

fn http_method(payload: &Value) -> &str {
    payload
        .get("requestContext")
        .and_then(|c| c.get("http"))
        .and_then(|h| h.get("method"))
        .and_then(|m| m.as_str())
        .or_else(|| payload.get("httpMethod").and_then(|m| m.as_str()))
        .unwrap_or("POST")
}

// ============================================================================
// Verification handshake
// ============================================================================

fn handle_verification(config: &AppConfig, payload: &Value) -> Value {
    // hub.* params arrive pre-parsed or in the raw query string, depending
    // on the proxy integration.
    let params: HashMap<String, String> = if let Some(qs) = payload
        .get("queryStringParameters")
        .and_then(|v| v.as_object())
    {
        qs.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    } else if let Some(raw) = payload.get("rawQueryString").and_then(|v| v.as_str()) {
        match parsing::parse_query_string(raw) {
            Ok(map) => map,
            Err(e) => {
                error!("Failed to parse query string: {}", e);
                return helpers::err_response(400, "Bad query string");
            }
        }
    } else {
        HashMap::new()
    };

    let mode = params.get("hub.mode").map(String::as_str).unwrap_or("");
    let token = params
        .get("hub.verify_token")
        .map(String::as_str)
        .unwrap_or("");
    let challenge = params
        .get("hub.challenge")
        .map(String::as_str)
        .unwrap_or("");

    if mode == "subscribe" && !config.verify_token.is_empty() && token == config.verify_token {
        info!("Webhook verification handshake accepted");
        helpers::ok_challenge(challenge)
    } else {
        error!("Webhook verification failed: mode or verify token mismatch");
        helpers::err_response(403, "Verification failed")
    }
}

// ============================================================================
// Request Validation Helpers
// ============================================================================

fn extract_body(payload: &Value) -> Result<String, Value> {
    let Some(body) = payload.get("body") else {
        error!("Request missing body");
        return Err(helpers::err_response(400, "Missing body"));
    };

    let Some(body_str) = body.as_str() else {
        error!("Request body is not a string");
        return Err(helpers::err_response(400, "Invalid body format"));
    };

    if payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        let decoded = STANDARD.decode(body_str).map_err(|e| {
            error!("Failed to decode base64 body: {}", e);
            helpers::err_response(400, "Invalid body encoding")
        })?;
        return String::from_utf8(decoded).map_err(|e| {
            error!("Body is not valid UTF-8: {}", e);
            helpers::err_response(400, "Invalid body encoding")
        });
    }

    Ok(body_str.to_string())
}

fn verify_signature(body: &str, headers: &Value, config: &AppConfig) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, "X-Hub-Signature-256") else {
        error!("Missing X-Hub-Signature-256 header");
        return Err(helpers::err_response(
            401,
            "Missing X-Hub-Signature-256 header",
        ));
    };

    if !signature::verify_webhook_signature(body, sig, &config.app_secret) {
        error!("Webhook signature verification failed");
        return Err(helpers::err_response(401, "Invalid webhook signature"));
    }

    Ok(())
}
