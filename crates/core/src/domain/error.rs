// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Backend label must not be empty")]
    EmptyLabel,

    #[error("Duplicate environment override '{0}' in backend '{1}'")]
    DuplicateOverride(String, String),

    #[error("Executable path must not be empty")]
    EmptyExecutable,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
