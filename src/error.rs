use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillHubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM API returned no choices")]
    EmptyCompletion,

    #[error("Classification failed: {0}")]
    Classification(#[source] Box<SkillHubError>),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SkillHubError {
    pub fn classification(cause: SkillHubError) -> Self {
        Self::Classification(Box::new(cause))
    }
}

pub type Result<T> = std::result::Result<T, SkillHubError>;
