//! Ordered fallback over the provider's usable backends.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{GenerationError, ProviderError};
use crate::provider::{Backend, GenerationProvider};

/// Successful generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub generated_text: String,
    /// Backend that produced the text.
    pub backend: String,
}

/// Runs generation requests against whichever backends are usable.
///
/// Holds no cache: every call re-queries the provider, and each backend is
/// attempted at most once per call. Discovery and every attempt share the
/// same per-step deadline, so a call is bounded by
/// `attempt_timeout * (1 + backends)`.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Option<Arc<dyn GenerationProvider>>,
    attempt_timeout: Duration,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn GenerationProvider>, attempt_timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            attempt_timeout,
        }
    }

    /// An orchestrator without a credential; every call fails with
    /// [`GenerationError::NotConfigured`].
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            attempt_timeout: Duration::ZERO,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn GenerationProvider>, GenerationError> {
        self.provider.as_ref().ok_or(GenerationError::NotConfigured)
    }

    /// Backends that advertise content generation, in provider order.
    pub async fn list_usable_backends(&self) -> Result<Vec<Backend>, GenerationError> {
        let provider = self.provider()?;
        let backends = match tokio::time::timeout(self.attempt_timeout, provider.list_backends())
            .await
        {
            Ok(result) => result.map_err(GenerationError::Discovery)?,
            Err(_) => {
                return Err(GenerationError::Discovery(ProviderError::Timeout {
                    secs: self.attempt_timeout.as_secs(),
                }))
            }
        };
        Ok(backends
            .into_iter()
            .filter(Backend::supports_generation)
            .collect())
    }

    /// Generate text for `prompt`, returning the first backend's success.
    pub async fn generate(&self, prompt: &str) -> Result<Generated, GenerationError> {
        let provider = self.provider()?;
        let backends = self.list_usable_backends().await?;
        if backends.is_empty() {
            return Err(GenerationError::NoUsableBackends);
        }

        let mut attempted = Vec::with_capacity(backends.len());
        let mut last_error = String::new();

        for backend in backends {
            attempted.push(backend.name.clone());

            match self.attempt(provider.as_ref(), &backend.name, prompt).await {
                Ok(text) => {
                    tracing::info!(
                        backend = %backend.name,
                        attempts = attempted.len(),
                        "AI generation succeeded",
                    );
                    return Ok(Generated {
                        generated_text: text,
                        backend: backend.name,
                    });
                }
                Err(e) => {
                    tracing::warn!(backend = %backend.name, error = %e, "AI backend attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(GenerationError::AllBackendsFailed {
            attempted,
            last_error,
        })
    }

    async fn attempt(
        &self,
        provider: &dyn GenerationProvider,
        backend: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.attempt_timeout, provider.generate(backend, prompt)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                secs: self.attempt_timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// Scripted provider: each backend either succeeds with its own name,
    /// fails, or hangs.
    #[derive(Default)]
    struct FakeProvider {
        backends: Vec<Backend>,
        failing: Vec<&'static str>,
        hanging: Vec<&'static str>,
        discovery_fails: bool,
        discovery_hangs: bool,
        list_calls: AtomicUsize,
        generate_calls: Mutex<Vec<String>>,
    }

    fn backend(name: &str, methods: &[&str]) -> Backend {
        Backend {
            name: name.to_string(),
            display_name: None,
            description: None,
            supported_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[async_trait]
    impl GenerationProvider for FakeProvider {
        async fn list_backends(&self) -> Result<Vec<Backend>, ProviderError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.discovery_hangs {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.discovery_fails {
                return Err(ProviderError::Api {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(self.backends.clone())
        }

        async fn generate(&self, backend: &str, prompt: &str) -> Result<String, ProviderError> {
            self.generate_calls.lock().unwrap().push(backend.to_string());
            if self.hanging.iter().any(|h| *h == backend) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing.iter().any(|f| *f == backend) {
                return Err(ProviderError::Other(format!("{backend} exploded")));
            }
            Ok(format!("{backend}: {prompt}"))
        }
    }

    fn orchestrator(provider: Arc<FakeProvider>) -> Orchestrator {
        Orchestrator::new(provider, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn falls_back_to_second_backend() {
        let provider = Arc::new(FakeProvider {
            backends: vec![
                backend("first", &["generateContent"]),
                backend("second", &["generateContent"]),
            ],
            failing: vec!["first"],
            ..Default::default()
        });

        let result = orchestrator(provider.clone()).generate("brief").await.unwrap();
        assert_eq!(result.backend, "second");
        assert_eq!(result.generated_text, "second: brief");
        assert_eq!(*provider.generate_calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let provider = Arc::new(FakeProvider {
            backends: vec![
                backend("first", &["generateContent"]),
                backend("second", &["generateContent"]),
            ],
            ..Default::default()
        });

        let result = orchestrator(provider.clone()).generate("brief").await.unwrap();
        assert_eq!(result.backend, "first");
        assert_eq!(provider.generate_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn skips_backends_without_generation_support() {
        let provider = Arc::new(FakeProvider {
            backends: vec![
                backend("embedder", &["embedContent"]),
                backend("writer", &["generateContent"]),
            ],
            ..Default::default()
        });

        let usable = orchestrator(provider.clone()).list_usable_backends().await.unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].name, "writer");

        let result = orchestrator(provider.clone()).generate("x").await.unwrap();
        assert_eq!(result.backend, "writer");
        assert_eq!(*provider.generate_calls.lock().unwrap(), vec!["writer"]);
    }

    #[tokio::test]
    async fn all_failures_aggregate_attempts_and_last_error() {
        let provider = Arc::new(FakeProvider {
            backends: vec![
                backend("a", &["generateContent"]),
                backend("b", &["generateContent"]),
            ],
            failing: vec!["a", "b"],
            ..Default::default()
        });

        let err = orchestrator(provider).generate("x").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::AllBackendsFailed { ref attempted, ref last_error }
                if attempted == &["a", "b"] && last_error == "b exploded"
        );
    }

    #[tokio::test]
    async fn hanging_backend_times_out_and_advances() {
        let provider = Arc::new(FakeProvider {
            backends: vec![
                backend("slow", &["generateContent"]),
                backend("fast", &["generateContent"]),
            ],
            hanging: vec!["slow"],
            ..Default::default()
        });

        let result = orchestrator(provider).generate("x").await.unwrap();
        assert_eq!(result.backend, "fast");
    }

    #[tokio::test]
    async fn missing_credential_attempts_nothing() {
        let err = Orchestrator::unconfigured().generate("x").await.unwrap_err();
        assert_matches!(err, GenerationError::NotConfigured);
        assert!(!Orchestrator::unconfigured().is_configured());
    }

    #[tokio::test]
    async fn discovery_failure_and_empty_list() {
        let broken = Arc::new(FakeProvider {
            discovery_fails: true,
            ..Default::default()
        });
        assert_matches!(
            orchestrator(broken).generate("x").await,
            Err(GenerationError::Discovery(_))
        );

        let empty = Arc::new(FakeProvider::default());
        assert_matches!(
            orchestrator(empty).generate("x").await,
            Err(GenerationError::NoUsableBackends)
        );
    }

    #[tokio::test]
    async fn hanging_discovery_times_out() {
        let provider = Arc::new(FakeProvider {
            backends: vec![backend("only", &["generateContent"])],
            discovery_hangs: true,
            ..Default::default()
        });

        let err = orchestrator(provider.clone()).generate("x").await.unwrap_err();
        assert_matches!(err, GenerationError::Discovery(ProviderError::Timeout { .. }));
        assert!(provider.generate_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_call_requeries_backends() {
        let provider = Arc::new(FakeProvider {
            backends: vec![backend("only", &["generateContent"])],
            ..Default::default()
        });
        let orch = orchestrator(provider.clone());

        orch.generate("one").await.unwrap();
        orch.generate("two").await.unwrap();
        assert_eq!(provider.list_calls.load(Ordering::SeqCst), 2);
    }
}
