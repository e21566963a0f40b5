use darp_core::DarpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("benchmark parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid instance: {0}")]
    Invalid(String),

    #[error(transparent)]
    Core(#[from] DarpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InstanceResult<T> = Result<T, InstanceError>;
