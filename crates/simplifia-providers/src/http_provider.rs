//! HTTP adapter for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers OpenAI and DeepSeek: both take a system-role instruction plus a
//! user-role text and answer with `choices[0].message.content`. They differ
//! only in endpoint, pinned model, temperature and timeout, all of which come
//! from the [`ProviderSpec`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use simplifia_core::config::ProviderConfig;
use simplifia_core::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

use crate::error::{api_error_from_response, ProviderError};
use crate::gemini::GeminiProvider;
use crate::registry::{ProviderKind, ProviderSpec, WireFormat};
use crate::traits::SimplifyProvider;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A chat-completions adapter talking directly to the provider over HTTPS.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.deepseek.com"`).
    api_base: String,
    /// API key for Bearer authentication. Empty when not configured.
    api_key: String,
    /// Model sent with every request.
    model: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from a provider config and spec.
    ///
    /// Config values win over the spec defaults for `api_base` and `model`.
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, ProviderError> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| spec.default_model.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(spec.timeout_secs))
            .build()?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key: config.api_key.trim().to_string(),
            model,
            spec,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl SimplifyProvider for HttpProvider {
    async fn generate(&self, instruction: &str, text: &str) -> Result<String, ProviderError> {
        if !self.is_configured() {
            warn!(provider = self.spec.display_name, "No API key configured");
            return Err(ProviderError::MissingCredential);
        }

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::system(instruction), Message::user(text)],
            temperature: self.spec.temperature,
        };

        let url = self.completions_url();

        debug!(
            provider = self.spec.display_name,
            model = %self.model,
            text_len = text.len(),
            "Calling LLM"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                ProviderError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = api_error_from_response(response).await;
            error!(
                provider = self.spec.display_name,
                status = %status,
                error = %err,
                "API error"
            );
            return Err(err);
        }

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(
                    provider = self.spec.display_name,
                    error = %e,
                    "Failed to parse LLM response"
                );
                ProviderError::InvalidResponse(e.to_string())
            })?;

        let finish_reason = chat_resp.finish_reason().map(str::to_string);
        match chat_resp.first_content() {
            Some(content) => {
                debug!(
                    provider = self.spec.display_name,
                    output_len = content.len(),
                    "LLM response received"
                );
                Ok(content)
            }
            None => {
                warn!(
                    provider = self.spec.display_name,
                    finish_reason = finish_reason.as_deref().unwrap_or("none"),
                    "LLM returned no content"
                );
                Err(ProviderError::EmptyGeneration)
            }
        }
    }

    fn spec(&self) -> &'static ProviderSpec {
        self.spec
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build the adapter for `kind` from its config.
///
/// An unconfigured provider still yields an adapter: it answers every call
/// with [`ProviderError::MissingCredential`].
pub fn create_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Arc<dyn SimplifyProvider>, ProviderError> {
    let spec = kind.spec();

    debug!(
        provider = spec.display_name,
        configured = config.is_configured(),
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating provider adapter"
    );

    Ok(match spec.wire {
        WireFormat::ChatCompletions => Arc::new(HttpProvider::new(config, spec)?),
        WireFormat::GenerateContent => Arc::new(GeminiProvider::new(config, spec)?),
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
