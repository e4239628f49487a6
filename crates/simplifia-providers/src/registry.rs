//! Provider registry — static specs for the three supported LLM providers.
//!
//! Each `ProviderSpec` describes how to reach one provider: wire format,
//! default endpoint, pinned model, credential env var and timeout.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ─────────────────────────────────────────────
// ProviderKind — the routing tag
// ─────────────────────────────────────────────

/// The provider tag carried by every request, parsed case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    DeepSeek,
}

impl ProviderKind {
    /// Every kind, in registry order.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::DeepSeek,
    ];

    /// Canonical lowercase name (`"openai"`, `"gemini"`, `"deepseek"`).
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Static spec for this kind.
    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderKind::OpenAi => &PROVIDERS[0],
            ProviderKind::Gemini => &PROVIDERS[1],
            ProviderKind::DeepSeek => &PROVIDERS[2],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a provider tag matches none of the known providers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_by_name(s)
            .map(|spec| spec.kind)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Request/response shape spoken by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireFormat {
    /// OpenAI-style `/chat/completions` with system + user messages.
    ChatCompletions,
    /// Google `models.list` + `:generateContent` with a single combined prompt.
    GenerateContent,
}

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Internal name (e.g. `"deepseek"`).
    pub name: &'static str,
    /// Human-readable name for logs and messages. E.g. `"DeepSeek"`.
    pub display_name: &'static str,
    /// Environment variable holding the API key. E.g. `"DEEPSEEK_API_KEY"`.
    pub env_key: &'static str,
    pub wire: WireFormat,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Model used unless the config overrides it.
    /// Gemini picks its model at call time; this is its first preference.
    pub default_model: &'static str,
    /// Sampling temperature sent with the request, if any.
    pub temperature: Option<f64>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Gemini model identifiers, most preferred first. When none of these is
/// listed for the key, the first listed model is used.
pub const GEMINI_PREFERRED_MODELS: &[&str] = &[
    "models/gemini-1.5-flash",
    "models/gemini-1.5-flash-latest",
    "models/gemini-pro",
];

/// Complete list of supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        wire: WireFormat::ChatCompletions,
        default_api_base: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
        temperature: Some(0.7),
        timeout_secs: 600,
    },
    ProviderSpec {
        kind: ProviderKind::Gemini,
        name: "gemini",
        display_name: "Gemini",
        env_key: "GEMINI_API_KEY",
        wire: WireFormat::GenerateContent,
        default_api_base: "https://generativelanguage.googleapis.com",
        default_model: "models/gemini-1.5-flash",
        temperature: None,
        timeout_secs: 600,
    },
    // DeepSeek is reached with a plain JSON POST and a short timeout.
    ProviderSpec {
        kind: ProviderKind::DeepSeek,
        name: "deepseek",
        display_name: "DeepSeek",
        env_key: "DEEPSEEK_API_KEY",
        wire: WireFormat::ChatCompletions,
        default_api_base: "https://api.deepseek.com",
        default_model: "deepseek-chat",
        temperature: None,
        timeout_secs: 15,
    },
];

/// Find a provider spec by name, ignoring ASCII case.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
