//! Engine error types

use shoal_remote::RemoteFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{kind} ({id}) not found")]
    NotFound { kind: &'static str, id: String },

    #[error("no matching results")]
    EmptyResult,

    #[error("expected a single result, found {0}")]
    TooManyResults(usize),

    #[error("wait timed out in state {status:?}")]
    WaitTimeout { status: String },

    #[error("waiting halted by unexpected state {status:?}")]
    UnexpectedStatus { status: String },

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] RemoteFault),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    /// True for the engine's own not-found as well as a remote not-found
    /// fault passed through untouched.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::EmptyResult => true,
            Self::Remote(fault) => fault.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
