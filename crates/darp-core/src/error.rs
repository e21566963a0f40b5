//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `DarpError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The common base error for `darp-*` crates.
#[derive(Debug, Error)]
pub enum DarpError {
    /// Parameters that cannot describe a valid world.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `darp-*` crates.
pub type DarpResult<T> = Result<T, DarpError>;
