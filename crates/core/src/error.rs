//! Core error types for the script API

#[derive(thiserror::Error, Debug)]
pub enum ScriptApiError {
    #[error("Script error: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScriptApiError>;
