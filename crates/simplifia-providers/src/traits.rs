//! Provider trait — the seam between the dispatcher and each vendor's wire format.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::registry::ProviderSpec;

/// Trait that all provider adapters implement.
///
/// One instance per provider is built at startup and shared across requests.
#[async_trait]
pub trait SimplifyProvider: Send + Sync {
    /// Generate an explanation of `text` following `instruction`.
    ///
    /// Returns `Err(ProviderError::MissingCredential)` without any network
    /// call when no API key is configured.
    async fn generate(&self, instruction: &str, text: &str) -> Result<String, ProviderError>;

    /// Static spec of the provider behind this adapter.
    fn spec(&self) -> &'static ProviderSpec;

    /// Whether an API key is available.
    fn is_configured(&self) -> bool;

    /// Model used for calls (Gemini: the first preference).
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str {
        self.spec().display_name
    }
}
