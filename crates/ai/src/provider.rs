use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

/// Generation method a backend must advertise to be usable.
pub const CONTENT_GENERATION_METHOD: &str = "generateContent";

/// One backend (model) offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backend {
    /// Identifier passed back to [`GenerationProvider::generate`].
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(skip)]
    pub supported_methods: Vec<String>,
}

impl Backend {
    pub fn supports_generation(&self) -> bool {
        self.supported_methods
            .iter()
            .any(|m| m == CONTENT_GENERATION_METHOD)
    }
}

/// An external text-generation service.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// All backends the provider currently offers, in its own order.
    async fn list_backends(&self) -> Result<Vec<Backend>, ProviderError>;

    /// Run one generation against `backend`.
    async fn generate(&self, backend: &str, prompt: &str) -> Result<String, ProviderError>;
}
