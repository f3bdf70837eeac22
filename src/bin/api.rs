pub use leaguebot::api::handler::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    leaguebot::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
