use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    #[error("Remote query failed: {message}")]
    RemoteQuery { message: String },

    #[error("Review system query failed: {message}")]
    ReviewQuery { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SweeperError>;

impl SweeperError {
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    pub fn remote_query(message: impl Into<String>) -> Self {
        Self::RemoteQuery {
            message: message.into(),
        }
    }

    pub fn review_query(message: impl Into<String>) -> Self {
        Self::ReviewQuery {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }
}

impl From<&str> for SweeperError {
    fn from(message: &str) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}

impl From<String> for SweeperError {
    fn from(message: String) -> Self {
        Self::Config { message }
    }
}
