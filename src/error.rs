//! # Error Types
//!
//! All fallible operations in this crate surface one of the variants below:
//!
//! - **`Configuration`**: the caller wired the client up wrong (no connection
//!   factories, an entity type without a key field, sorting on a field the
//!   type does not have). Retrying will not help until the setup is fixed.
//! - **`Timeout`**: no free connection became available within the pool's
//!   wait budget. The caller may retry explicitly; nothing is retried
//!   automatically.
//! - **`Operation`**: any RPC, decode, or mapping failure that happened while
//!   a unit of work was running. The original cause is preserved as the
//!   error source.
//!
//! An absent single-column value is *not* an error; reads report it as
//! `Ok(None)`.

use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for all client-facing operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The client or an entity type is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No free connection became available within the wait budget.
    #[error("timed out waiting for a connection after {0:?}")]
    Timeout(Duration),

    /// A store-facing unit of work failed. Carries the original cause.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    /// Wrap a collaborator failure into an operation error.
    pub fn operation(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Operation {
            message: message.into(),
            source,
        }
    }

    /// Build a configuration error from anything printable.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_preserves_cause() {
        let cause = anyhow::anyhow!("socket reset");
        let err = StoreError::operation("unable to perform insert operation", cause);
        assert_eq!(err.to_string(), "unable to perform insert operation");

        // The original cause must stay reachable through the source chain.
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "socket reset");
    }

    #[test]
    fn test_timeout_message_includes_budget() {
        let err = StoreError::Timeout(Duration::from_millis(250));
        assert!(err.to_string().contains("250ms"));
    }
}
