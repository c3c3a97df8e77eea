use reqwest::StatusCode;
use thiserror::Error;

/// Failures that stop the client before the first prompt is shown.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("No .env file found and OPENAI_API_KEY is not set in the environment")]
    MissingSource,
}

/// Everything that can go wrong while answering a single question.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("{0}")]
    Transport(String),

    #[error("Completion request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode completion response: {source}\nRaw response: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Completion response contained no choices")]
    NoChoices,
}
