//! Gemini adapter — Google Generative Language API.
//!
//! Every call first lists the models visible to the key, picks the first
//! entry of the preference list that is available (falling back to the first
//! listed model), then sends instruction and text as one combined prompt to
//! `:generateContent`. The fallback depends on Google's live catalog, so the
//! chosen model can change over time without any change on our side.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use simplifia_core::config::ProviderConfig;

use crate::error::{api_error_from_response, ProviderError};
use crate::registry::{ProviderSpec, GEMINI_PREFERRED_MODELS};
use crate::traits::SimplifyProvider;

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Largest page the models endpoint accepts.
const LIST_PAGE_SIZE: &str = "1000";
/// Upper bound on listing pages followed per request.
const MAX_LIST_PAGES: usize = 20;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if non-empty.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ─────────────────────────────────────────────
// Model selection
// ─────────────────────────────────────────────

/// Pick the first preferred model present in `available`, else the first
/// available model. `None` only when `available` is empty.
pub fn select_model<S: AsRef<str>>(available: &[String], preferred: &[S]) -> Option<String> {
    for model in preferred {
        let model = model.as_ref();
        if available.iter().any(|a| a.as_str() == model) {
            return Some(model.to_string());
        }
    }
    available.first().cloned()
}

/// Join instruction and text into the single prompt Gemini receives.
pub fn combined_prompt(instruction: &str, text: &str) -> String {
    format!("{instruction}\n\n{text}")
}

fn qualify_model(name: &str) -> String {
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{name}")
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

/// Adapter for the Gemini `generateContent` API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    /// Model preference list; a configured model goes first.
    preferred: Vec<String>,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("preferred", &self.preferred)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec) -> Result<Self, ProviderError> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let mut preferred: Vec<String> = Vec::with_capacity(GEMINI_PREFERRED_MODELS.len() + 1);
        if let Some(model) = config.model.as_deref() {
            preferred.push(qualify_model(model));
        }
        for model in GEMINI_PREFERRED_MODELS {
            if !preferred.iter().any(|p| p == model) {
                preferred.push(model.to_string());
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(spec.timeout_secs))
            .build()?;

        Ok(GeminiProvider {
            client,
            api_base,
            api_key: config.api_key.trim().to_string(),
            preferred,
            spec,
        })
    }

    fn base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base())
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/{}:generateContent", self.base(), qualify_model(model))
    }

    /// List the model names visible to the configured key, following
    /// `nextPageToken` across pages.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let listing = self.list_models_page(page_token.as_deref()).await?;
            names.extend(listing.models.into_iter().map(|m| m.name));

            match listing.next_page_token {
                Some(token) if !token.is_empty() && page_token.as_deref() != Some(token.as_str()) => {
                    page_token = Some(token);
                }
                _ => return Ok(names),
            }
        }

        warn!(
            provider = self.spec.display_name,
            pages = MAX_LIST_PAGES,
            "Model listing truncated"
        );
        Ok(names)
    }

    async fn list_models_page(&self, page_token: Option<&str>) -> Result<ListModelsResponse, ProviderError> {
        let mut request = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("pageSize", LIST_PAGE_SIZE)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        response
            .json::<ListModelsResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    /// Resolve which model to call for this request.
    async fn pick_model(&self) -> Result<String, ProviderError> {
        let available = self.list_models().await?;
        let model = select_model(&available, &self.preferred).ok_or(ProviderError::NoModelAvailable)?;

        if !self.preferred.contains(&model) {
            info!(
                provider = self.spec.display_name,
                model = %model,
                "No preferred model available, using first listed model"
            );
        }
        Ok(model)
    }

    async fn pick_and_generate(&self, instruction: &str, text: &str) -> Result<String, ProviderError> {
        let model = self.pick_model().await?;
        debug!(
            provider = self.spec.display_name,
            model = %model,
            text_len = text.len(),
            "Calling LLM"
        );
        self.generate_content(&model, combined_prompt(instruction, text))
            .await
    }

    async fn generate_content(&self, model: &str, prompt: String) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed.text().ok_or(ProviderError::EmptyGeneration)
    }
}

#[async_trait]
impl SimplifyProvider for GeminiProvider {
    async fn generate(&self, instruction: &str, text: &str) -> Result<String, ProviderError> {
        if !self.is_configured() {
            warn!(provider = self.spec.display_name, "No API key configured");
            return Err(ProviderError::MissingCredential);
        }

        let result = self.pick_and_generate(instruction, text).await;
        if let Err(ref e) = result {
            error!(provider = self.spec.display_name, error = %e, "Gemini call failed");
        }
        result
    }

    fn spec(&self) -> &'static ProviderSpec {
        self.spec
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model(&self) -> &str {
        self.preferred
            .first()
            .map(String::as_str)
            .unwrap_or(self.spec.default_model)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::registry::ProviderKind;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn provider(key: &str, base: &str) -> GeminiProvider {
        let config = ProviderConfig {
            api_key: key.into(),
            api_base: Some(base.into()),
            model: None,
        };
        GeminiProvider::new(&config, ProviderKind::Gemini.spec()).unwrap()
    }

    async fn mount_models(server: &MockServer, models: &[&str]) {
        let listing: Vec<serde_json::Value> = models
            .iter()
            .map(|m| serde_json::json!({ "name": m, "supportedGenerationMethods": ["generateContent"] }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(header(API_KEY_HEADER, "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": listing })))
            .mount(server)
            .await;
    }

    // ── Model selection ──

    #[test]
    fn test_select_first_preferred_present() {
        let available = names(&["models/gemini-pro", "models/gemini-1.5-flash-latest"]);
        assert_eq!(
            select_model(&available, GEMINI_PREFERRED_MODELS).as_deref(),
            Some("models/gemini-1.5-flash-latest")
        );
    }

    #[test]
    fn test_select_preference_order_wins_over_listing_order() {
        let available = names(&["models/gemini-pro", "models/gemini-1.5-flash"]);
        assert_eq!(
            select_model(&available, GEMINI_PREFERRED_MODELS).as_deref(),
            Some("models/gemini-1.5-flash")
        );
    }

    #[test]
    fn test_select_falls_back_to_first_listed() {
        let available = names(&["models/embedding-001", "models/gemini-2.0-flash"]);
        assert_eq!(
            select_model(&available, GEMINI_PREFERRED_MODELS).as_deref(),
            Some("models/embedding-001")
        );
    }

    #[test]
    fn test_select_empty_listing() {
        assert!(select_model(&[], GEMINI_PREFERRED_MODELS).is_none());
    }

    #[test]
    fn test_combined_prompt() {
        assert_eq!(combined_prompt("Explique.", "La photosynthèse"), "Explique.\n\nLa photosynthèse");
    }

    #[test]
    fn test_configured_model_goes_first() {
        let config = ProviderConfig {
            api_key: "k".into(),
            api_base: None,
            model: Some("gemini-pro".into()),
        };
        let p = GeminiProvider::new(&config, ProviderKind::Gemini.spec()).unwrap();
        assert_eq!(p.model(), "models/gemini-pro");
        assert_eq!(p.preferred.len(), GEMINI_PREFERRED_MODELS.len());
        assert_eq!(
            p.generate_url("gemini-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let p = provider("", &mock_server.uri());
        let err = p.generate("i", "t").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_generate_success_uses_preferred_model() {
        let mock_server = MockServer::start().await;
        mount_models(&mock_server, &["models/gemini-pro", "models/gemini-1.5-flash"]).await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header(API_KEY_HEADER, "g-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "Explique.\n\nLa photosynthèse" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Les plantes " }, { "text": "cuisinent au soleil." }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        let out = p.generate("Explique.", "La photosynthèse").await.unwrap();
        assert_eq!(out, "Les plantes cuisinent au soleil.");
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_first_listed_model() {
        let mock_server = MockServer::start().await;
        mount_models(&mock_server, &["models/gemini-2.5-pro", "models/gemini-2.0-flash"]).await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        assert_eq!(p.generate("i", "t").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_empty_listing_is_generic_error() {
        let mock_server = MockServer::start().await;
        mount_models(&mock_server, &[]).await;

        let p = provider("g-key", &mock_server.uri());
        let err = p.generate("i", "t").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoModelAvailable));
        assert_eq!(err.kind(), FailureKind::Generic);
    }

    #[tokio::test]
    async fn test_listing_failure_is_guarded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        let err = p.generate("i", "t").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Generic);
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_listing_follows_next_page_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "models/gemini-1.5-flash" }]
            })))
            .with_priority(1)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(query_param("pageSize", LIST_PAGE_SIZE))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "models/embedding-gecko-001" }],
                "nextPageToken": "p2"
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        assert_eq!(
            p.list_models().await.unwrap(),
            names(&["models/embedding-gecko-001", "models/gemini-1.5-flash"])
        );
        assert_eq!(p.generate("i", "t").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_listing_network_error_is_guarded() {
        // Point to a port that's not listening
        let p = provider("g-key", "http://127.0.0.1:1");
        let err = p.generate("i", "t").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
        assert_eq!(err.kind(), FailureKind::Generic);
    }

    #[tokio::test]
    async fn test_resource_exhausted_is_insufficient() {
        let mock_server = MockServer::start().await;
        mount_models(&mock_server, &["models/gemini-1.5-flash"]).await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "code": 429,
                    "message": "Resource has been exhausted (e.g. check quota).",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        let err = p.generate("i", "t").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InsufficientBalance);
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_empty_generation() {
        let mock_server = MockServer::start().await;
        mount_models(&mock_server, &["models/gemini-1.5-flash"]).await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let p = provider("g-key", &mock_server.uri());
        let err = p.generate("i", "t").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyGeneration);
    }
}
