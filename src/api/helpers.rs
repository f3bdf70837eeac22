//! Response builders for the lambda proxy contract.

use serde_json::{Value, json};

/// Returns a 200 OK response with an empty JSON body.
#[must_use]
pub fn ok_empty() -> Value {
    json!({ "statusCode": 200, "body": "{}" })
}

/// Returns a 200 OK response carrying the raw handshake challenge string.
#[must_use]
pub fn ok_challenge(challenge: &str) -> Value {
    json!({ "statusCode": 200, "body": challenge })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}
