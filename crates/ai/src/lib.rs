//! AI generation orchestrator.
//!
//! A [`GenerationProvider`] exposes the backends (models) an external
//! service offers and runs one generation against a named backend. The
//! [`Orchestrator`] re-discovers usable backends on every call and tries
//! them in provider order, one attempt each under its own deadline, until
//! one succeeds.

pub mod error;
pub mod gemini;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use error::{GenerationError, ProviderError};
pub use gemini::GeminiProvider;
pub use orchestrator::{Generated, Orchestrator};
pub use provider::{Backend, GenerationProvider};
