use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to parse webhook event: {0}")]
    Parse(String),

    #[error("Failed to deliver message: {0}")]
    Messenger(String),

    #[error("League platform returned {status}: {body}")]
    Platform { status: u16, body: String },

    #[error("No league player matched the given identity")]
    PlayerNotFound,

    #[error("Not a captain of team {0}")]
    NotACaptain(u64),

    #[error("Unrecognized option payload: {0}")]
    MalformedOption(String),

    #[error("Failed to load or save player record: {0}")]
    Store(String),

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to interact with AWS services: {0}")]
    Aws(String),
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::Http(error.to_string())
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Messenger(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::Parse(error.to_string())
    }
}
