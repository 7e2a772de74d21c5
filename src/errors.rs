use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("FORMAT_INVALID: {0}")]
    Format(String),
    #[error("STORAGE_UNAVAILABLE: {0}")]
    Storage(String),
    #[error("DUPLICATE_USER: {0}")]
    DuplicateUser(String),
    #[error("PASSWORD_MISMATCH: {0}")]
    PasswordMismatch(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
