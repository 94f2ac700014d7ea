use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("INVALID_INPUT: {0}")]
    Invalid(String),
    #[error("CONFIG_INVALID: {0}")]
    Config(String),
    #[error("STORE_IO: {0}")]
    Io(String),
    #[error("REMOTE_FAILURE: {0}")]
    Remote(String),
    #[error("BACKEND_UNAVAILABLE: {0}")]
    Unavailable(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<ureq::Error> for AppError {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                Self::Remote(format!("HTTP {code}: {}", body.trim()))
            }
            other => Self::Remote(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
