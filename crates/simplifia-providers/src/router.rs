//! Request dispatcher — resolves the level prompt, routes to an adapter, and
//! folds adapter failures into the response text.
//!
//! Two failure channels:
//! - adapter failures (missing key, no credit, provider error, empty answer)
//!   become a normal `output` sentence;
//! - an unknown provider tag or a fault outside the adapters becomes a
//!   [`DispatchError`] that the HTTP layer turns into a 400/500.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use simplifia_core::config::ProvidersConfig;
use simplifia_core::types::{SimplifyRequest, SimplifyResponse};
use simplifia_core::PromptTable;

use crate::error::ProviderError;
use crate::http_provider::create_provider;
use crate::registry::ProviderKind;
use crate::traits::SimplifyProvider;

// ─────────────────────────────────────────────
// DispatchError
// ─────────────────────────────────────────────

/// Failures surfaced as HTTP errors instead of response text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{0}")]
    Internal(String),
}

impl DispatchError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::UnknownProvider(_) => 400,
            DispatchError::Internal(_) => 500,
        }
    }
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

/// Holds the prompt table and one adapter per provider, both fixed at startup.
#[derive(Clone)]
pub struct Dispatcher {
    prompts: PromptTable,
    adapters: HashMap<ProviderKind, Arc<dyn SimplifyProvider>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.adapters.keys().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("Dispatcher").field("adapters", &kinds).finish()
    }
}

impl Dispatcher {
    /// Empty dispatcher; register adapters with [`with_adapter`](Self::with_adapter).
    pub fn new(prompts: PromptTable) -> Self {
        Dispatcher {
            prompts,
            adapters: HashMap::new(),
        }
    }

    /// Build the three adapters from config.
    pub fn from_config(
        prompts: PromptTable,
        providers: &ProvidersConfig,
    ) -> Result<Self, ProviderError> {
        let mut dispatcher = Dispatcher::new(prompts);
        for kind in ProviderKind::ALL {
            let config = providers.get_by_name(kind.name()).cloned().unwrap_or_default();
            dispatcher = dispatcher.with_adapter(create_provider(kind, &config)?);
        }
        Ok(dispatcher)
    }

    /// Register (or replace) the adapter for its provider kind.
    pub fn with_adapter(mut self, adapter: Arc<dyn SimplifyProvider>) -> Self {
        self.adapters.insert(adapter.spec().kind, adapter);
        self
    }

    /// The adapter registered for `kind`, if any.
    pub fn adapter(&self, kind: ProviderKind) -> Option<&Arc<dyn SimplifyProvider>> {
        self.adapters.get(&kind)
    }

    pub fn prompts(&self) -> &PromptTable {
        &self.prompts
    }

    /// Resolve a level to its instruction (default prompt on miss).
    pub fn resolve(&self, level: &str) -> &'static str {
        self.prompts.resolve(level)
    }

    /// Route `text` + `instruction` to the provider named by `provider`.
    ///
    /// Adapter failures come back as `Ok` with a user-facing sentence.
    pub async fn dispatch(
        &self,
        text: &str,
        instruction: &str,
        provider: &str,
    ) -> Result<String, DispatchError> {
        let kind: ProviderKind = provider.parse().map_err(|_| {
            warn!(provider = %provider, "Rejected unknown provider");
            DispatchError::UnknownProvider(provider.to_string())
        })?;

        let adapter = self.adapters.get(&kind).ok_or_else(|| {
            DispatchError::Internal(format!("no adapter registered for provider '{kind}'"))
        })?;

        match adapter.generate(instruction, text).await {
            Ok(output) => Ok(output),
            Err(e) => {
                let kind_of_failure = e.kind();
                debug!(
                    provider = adapter.display_name(),
                    failure = ?kind_of_failure,
                    error = %e,
                    "Provider call failed, answering with message"
                );
                Ok(e.user_message(adapter.spec()))
            }
        }
    }

    /// Full request cycle: resolve the level, dispatch, wrap the output.
    pub async fn simplify(
        &self,
        request: &SimplifyRequest,
    ) -> Result<SimplifyResponse, DispatchError> {
        let instruction = self.resolve(&request.level);
        let output = self
            .dispatch(&request.text, instruction, &request.provider)
            .await?;
        Ok(SimplifyResponse::new(output))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
