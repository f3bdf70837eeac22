//! Webhook signature verification.

use leaguebot::api::signature::{compute_signature, verify_webhook_signature};

#[test]
fn test_signature_roundtrip() {
    let body = r#"{"object":"page","entry":[]}"#;
    let secret = "test_app_secret";

    let signature = compute_signature(body, secret);
    assert!(signature.starts_with("sha256="));
    assert!(verify_webhook_signature(body, &signature, secret));
}

#[test]
fn test_tampered_body_fails_verification() {
    let secret = "test_app_secret";
    let signature = compute_signature(r#"{"object":"page"}"#, secret);

    assert!(!verify_webhook_signature(
        r#"{"object":"page","entry":[{}]}"#,
        &signature,
        secret
    ));
}

#[test]
fn test_wrong_secret_fails_verification() {
    let body = r#"{"object":"page"}"#;
    let signature = compute_signature(body, "right_secret");

    assert!(!verify_webhook_signature(body, &signature, "wrong_secret"));
}

#[test]
fn test_missing_prefix_fails_verification() {
    let body = r#"{"object":"page"}"#;
    let secret = "test_app_secret";
    let raw_hex = compute_signature(body, secret)
        .trim_start_matches("sha256=")
        .to_string();

    assert!(!verify_webhook_signature(body, &raw_hex, secret));
}
