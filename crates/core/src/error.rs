use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Journey {0} not found")]
    NotFound(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Prompt must not be blank")]
    EmptyPrompt,

    #[error("A journey generation is already in progress")]
    GenerationInProgress,

    #[error("Journey generation failed: {0}")]
    Generation(String),

    #[error("Journey {0} is not a shareable template")]
    NotShareableTemplate(String),

    #[error("Unknown step type: {0}")]
    UnknownStepType(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for StudioError {
    fn from(err: config::ConfigError) -> Self {
        StudioError::Config(err.to_string())
    }
}
