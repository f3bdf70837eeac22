use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

/// Verify the provider's `X-Hub-Signature-256` header: `sha256=` followed by
/// the hex HMAC-SHA256 of the raw request body under the app secret.
pub fn verify_webhook_signature(request_body: &str, signature: &str, app_secret: &str) -> bool {
    let Some(received_hex) = signature.strip_prefix("sha256=") else {
        error!("Signature header missing sha256= prefix");
        return false;
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return false;
        }
    };
    mac.update(request_body.as_bytes());
    let computed_hex = hex::encode(mac.finalize().into_bytes());

    if computed_hex == received_hex {
        true
    } else {
        error!(
            "Signature verification failed. Computed: 'sha256={}', Received: '{}'",
            computed_hex, signature
        );
        false
    }
}

pub fn compute_signature(request_body: &str, app_secret: &str) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(request_body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
