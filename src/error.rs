//! Error types for daily-poster

use crate::config::REQUIRED_CREDENTIAL_VARS;
use crate::message::MAX_MESSAGE_CHARS;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Template format error: {0}")]
    TemplateFormat(String),

    #[error("Message is {count} characters (limit {}): {preview}", MAX_MESSAGE_CHARS)]
    MessageTooLong { count: usize, preview: String },

    #[error(
        "Missing one or more required environment variables ({}).\nRequired: {}",
        .missing.join(", "),
        REQUIRED_CREDENTIAL_VARS.join(", ")
    )]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("Network error while posting: {0}")]
    Transport(String),

    #[error("Post failed: {status} {body}")]
    RemoteRejection { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TemplateFormat(_) => 2,
            Error::MessageTooLong { .. } => 3,
            Error::MissingCredentials { .. } => 4,
            Error::Transport(_) => 5,
            Error::RemoteRejection { .. } => 6,
            Error::Io(_) | Error::Json(_) | Error::Config(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
