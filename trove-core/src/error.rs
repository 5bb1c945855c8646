use thiserror::Error;

/// Unified error type for the trove workspace.
///
/// Covers provider-tagged failures, timeouts, not-found conditions,
/// argument validation, data-shape problems, and store failures. An HTTP
/// edge maps these onto its own taxonomy (not-found to 404, invalid
/// arguments to 400, provider failures to a 502-class response, store
/// failures to 500).
#[derive(Debug, Error)]
pub enum TroveError {
    /// An individual provider fetch failed (transport, status, or decode).
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Provider id that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A provider fetch exceeded the configured timeout.
    #[error("provider timed out: {provider}")]
    ProviderTimeout {
        /// Provider id that timed out.
        provider: String,
    },

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "provider provider1".
        what: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with returned or expected data (missing fields, bad shapes).
    #[error("data issue: {0}")]
    Data(String),

    /// The backing store reported a failure.
    #[error("store error: {0}")]
    Store(String),
}

impl TroveError {
    /// Helper: build a [`TroveError::Provider`] with the provider id and message.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a [`TroveError::ProviderTimeout`].
    pub fn provider_timeout(provider: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
        }
    }

    /// Helper: build a [`TroveError::NotFound`] for a description of the
    /// missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a [`TroveError::Store`].
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Whether this error is a not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
