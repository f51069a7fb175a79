/// Errors from a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response without any generated text.
    #[error("Provider returned no generated text")]
    EmptyResponse,

    /// The attempt exceeded its deadline.
    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credential is configured; nothing was attempted.
    #[error("AI generation is not configured")]
    NotConfigured,

    /// Backend discovery itself failed.
    #[error("Could not list generation backends: {0}")]
    Discovery(#[source] ProviderError),

    /// Discovery succeeded but no backend supports content generation.
    #[error("No generation backends are available")]
    NoUsableBackends,

    /// Every usable backend was tried once and failed.
    #[error("All generation backends failed (tried {}): {last_error}", attempted.join(", "))]
    AllBackendsFailed {
        attempted: Vec<String>,
        last_error: String,
    },
}

impl GenerationError {
    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_error_lists_attempts() {
        let err = GenerationError::AllBackendsFailed {
            attempted: vec!["a".into(), "b".into()],
            last_error: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "All generation backends failed (tried a, b): boom"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_credential_is_permanent() {
        assert!(!GenerationError::NotConfigured.is_retryable());
    }
}
