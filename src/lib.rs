/// Leaguebot - a Messenger webhook bot for a rec sports league.
///
/// The bot receives messaging-platform webhook events (free text, button
/// clicks, quick replies), keeps a small per-user conversation state, and
/// calls the league's REST platform to answer questions or submit game
/// scores.
///
/// # Architecture
///
/// A single API Lambda handles everything synchronously:
/// 1. `GET /` answers the platform's verification handshake.
/// 2. `POST /` verifies the `X-Hub-Signature-256` header, normalizes the
///    event envelope into [`core::models::Message`]s, and dispatches each
///    one through the action state machine.
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SSM Parameter Store for per-user player records
/// - reqwest for the Messenger Send API and the league platform API
/// - Tokio for the async runtime
// Module declarations
pub mod actions;
pub mod api;
pub mod core;
pub mod errors;
pub mod messenger;
pub mod platform;
pub mod store;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called at the start of each Lambda
/// handler.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
