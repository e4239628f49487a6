//! LLM provider layer for SimplifIA.
//!
//! # Architecture
//!
//! - [`traits::SimplifyProvider`] — trait that all adapters implement
//! - [`registry`] — static specs for the 3 supported providers + tag parsing
//! - [`http_provider::HttpProvider`] — OpenAI-compatible chat completions (OpenAI, DeepSeek)
//! - [`gemini::GeminiProvider`] — Google `generateContent`
//! - [`error`] — adapter failures and their user-facing messages
//! - [`router::Dispatcher`] — level resolution + provider routing

pub mod error;
pub mod gemini;
pub mod http_provider;
pub mod registry;
pub mod router;
pub mod traits;

// Re-export main types for convenience
pub use error::{FailureKind, ProviderError};
pub use gemini::GeminiProvider;
pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderKind, ProviderSpec, PROVIDERS};
pub use router::{DispatchError, Dispatcher};
pub use traits::SimplifyProvider;
