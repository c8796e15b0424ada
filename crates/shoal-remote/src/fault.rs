//! Remote fault taxonomy
//!
//! Every control-plane call fails with exactly one of these. The engine's
//! error handling is keyed on this closed set: not-found is expected during
//! read/delete, a "no modifications were requested" parameter fault is an
//! out-of-band-drift no-op, invalid-state and throttling are retried within
//! bounded windows, everything else is fatal to the current pass.

use thiserror::Error;

/// Object kinds used in not-found and invalid-state faults
pub mod kinds {
    pub const REPLICATION_GROUP: &str = "cache replication group";
    pub const CACHE_CLUSTER: &str = "cache cluster";
    pub const GLOBAL_GROUP: &str = "global replication group";
    pub const PARAMETER_GROUP: &str = "parameter group";
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFault {
    #[error("{kind} ({id}) not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid parameter combination: {0}")]
    InvalidParameterCombination(String),

    #[error("invalid parameter value: {0}")]
    InvalidParameterValue(String),

    #[error("{kind} is not in a valid state: {message}")]
    InvalidState { kind: &'static str, message: String },

    #[error("operation not supported in this partition: {0}")]
    UnsupportedInPartition(String),

    #[error("rate limit exceeded: {0}")]
    Throttled(String),

    #[error("remote API error: {0}")]
    Api(String),
}

impl RemoteFault {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The desired state already matched the remote state, usually because of
    /// an out-of-band change. Treated as success by the executor.
    pub fn is_no_modifications_requested(&self) -> bool {
        matches!(self, Self::InvalidParameterCombination(message)
            if message.contains("No modifications were requested"))
    }

    /// Disassociation target was never (or is no longer) a member.
    pub fn is_not_associated(&self) -> bool {
        matches!(self, Self::InvalidParameterValue(message)
            if message.contains("is not associated with"))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

pub type Result<T> = std::result::Result<T, RemoteFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_modifications_predicate() {
        let fault = RemoteFault::InvalidParameterCombination(
            "No modifications were requested".to_string(),
        );
        assert!(fault.is_no_modifications_requested());

        let other = RemoteFault::InvalidParameterCombination("bad pair".to_string());
        assert!(!other.is_no_modifications_requested());
    }

    #[test]
    fn test_not_associated_predicate() {
        let fault = RemoteFault::InvalidParameterValue(
            "rg-1 is not associated with global group gg-1".to_string(),
        );
        assert!(fault.is_not_associated());
    }
}
