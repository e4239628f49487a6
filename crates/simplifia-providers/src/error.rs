//! Provider failures and their classification into user-facing messages.
//!
//! Every adapter returns [`ProviderError`]; the dispatcher turns it into a
//! soft `output` sentence via [`ProviderError::user_message`]. Classification
//! lives here only, so all providers agree on what "insufficient credit" means.

use thiserror::Error;
use tracing::debug;

use simplifia_core::types::ApiErrorEnvelope;

use crate::registry::ProviderSpec;

/// Marker contained in the missing-credential message.
pub const MISSING_CREDENTIAL_MARKER: &str = "Clé API";
/// Marker contained in the insufficient-credit message.
pub const INSUFFICIENT_CREDIT_MARKER: &str = "Crédit insuffisant";
/// Marker contained in the generic provider error message.
pub const PROVIDER_ERROR_MARKER: &str = "❌ Erreur";
/// Fixed output when a provider answered without usable text.
pub const COULD_NOT_SIMPLIFY: &str = "❌ Impossible de simplifier ce texte pour le moment.";

/// Machine-readable codes that mean the account ran out of credit.
const INSUFFICIENT_CODES: &[&str] = &[
    "insufficient_quota",
    "insufficient_balance",
    "billing_hard_limit_reached",
    "RESOURCE_EXHAUSTED",
];

/// Substrings that betray an out-of-credit condition in free-form error text.
const INSUFFICIENT_HINTS: &[&str] = &["insufficient", "quota", "balance", "billing"];

// ─────────────────────────────────────────────
// ProviderError
// ─────────────────────────────────────────────

/// A failure inside a provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("API error [{status}]: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no model available for this key")]
    NoModelAvailable,

    #[error("empty generation")]
    EmptyGeneration,
}

/// How a failure is presented to the end user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    MissingCredential,
    InsufficientBalance,
    Generic,
    EmptyGeneration,
}

impl ProviderError {
    /// Classify the failure: structured status/code first, then text hints.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::MissingCredential => FailureKind::MissingCredential,
            ProviderError::EmptyGeneration => FailureKind::EmptyGeneration,
            ProviderError::Api { status, code, .. }
                if *status == 402 || code.as_deref().is_some_and(is_insufficient_code) =>
            {
                FailureKind::InsufficientBalance
            }
            other if mentions_insufficient_credit(&other.to_string()) => {
                FailureKind::InsufficientBalance
            }
            _ => FailureKind::Generic,
        }
    }

    /// Sentence returned in `output` for this failure.
    pub fn user_message(&self, spec: &ProviderSpec) -> String {
        match self.kind() {
            FailureKind::MissingCredential => format!(
                "⚠️ {MISSING_CREDENTIAL_MARKER} {} manquante ou quota insuffisant. \
                 Définissez {} sur le serveur.",
                spec.display_name, spec.env_key
            ),
            FailureKind::InsufficientBalance => format!(
                "⚠️ {INSUFFICIENT_CREDIT_MARKER} sur le compte {}. \
                 Rechargez le solde ou choisissez un autre moteur.",
                spec.display_name
            ),
            FailureKind::EmptyGeneration => COULD_NOT_SIMPLIFY.to_string(),
            FailureKind::Generic => {
                format!("{PROVIDER_ERROR_MARKER} {} : {}", spec.display_name, self)
            }
        }
    }
}

fn is_insufficient_code(code: &str) -> bool {
    INSUFFICIENT_CODES.iter().any(|c| code.eq_ignore_ascii_case(c))
}

/// Text heuristic for providers that only return unstructured messages.
pub fn mentions_insufficient_credit(text: &str) -> bool {
    let lower = text.to_lowercase();
    INSUFFICIENT_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Build a [`ProviderError::Api`] from a non-2xx response.
///
/// Parses the `{"error": {...}}` envelope when present; otherwise keeps the raw body.
pub(crate) async fn api_error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let envelope: ApiErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
    let (code, message) = match envelope.error {
        Some(detail) => {
            let code = detail.code_str();
            (code, detail.message.unwrap_or_else(|| body.clone()))
        }
        None if body.trim().is_empty() => (
            None,
            status.canonical_reason().unwrap_or("unknown error").to_string(),
        ),
        None => (None, body),
    };

    debug!(status = %status, code = ?code, "Parsed provider error body");

    ProviderError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{find_by_name, ProviderKind};

    fn api(status: u16, code: Option<&str>, message: &str) -> ProviderError {
        ProviderError::Api {
            status,
            code: code.map(String::from),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_payment_required_is_insufficient() {
        assert_eq!(
            api(402, None, "Payment Required").kind(),
            FailureKind::InsufficientBalance
        );
    }

    #[test]
    fn test_structured_codes_are_insufficient() {
        assert_eq!(
            api(429, Some("insufficient_quota"), "try later").kind(),
            FailureKind::InsufficientBalance
        );
        assert_eq!(
            api(429, Some("RESOURCE_EXHAUSTED"), "exhausted").kind(),
            FailureKind::InsufficientBalance
        );
    }

    #[test]
    fn test_text_hints_are_insufficient() {
        assert_eq!(
            api(400, None, "You exceeded your current quota").kind(),
            FailureKind::InsufficientBalance
        );
        assert_eq!(
            api(400, None, "Insufficient Balance").kind(),
            FailureKind::InsufficientBalance
        );
        assert_eq!(
            ProviderError::InvalidResponse("account balance is zero".into()).kind(),
            FailureKind::InsufficientBalance
        );
    }

    #[test]
    fn test_insufficient_wording_alone_is_insufficient() {
        let err = api(400, None, "Insufficient funds in account");
        assert_eq!(err.kind(), FailureKind::InsufficientBalance);
        assert!(err
            .user_message(ProviderKind::OpenAi.spec())
            .contains(INSUFFICIENT_CREDIT_MARKER));
    }

    #[test]
    fn test_other_errors_are_generic() {
        assert_eq!(
            api(401, Some("invalid_api_key"), "Incorrect API key provided").kind(),
            FailureKind::Generic
        );
        assert_eq!(ProviderError::NoModelAvailable.kind(), FailureKind::Generic);
    }

    #[test]
    fn test_missing_credential_message() {
        let spec = find_by_name("openai").unwrap();
        let msg = ProviderError::MissingCredential.user_message(spec);
        assert!(msg.starts_with("⚠️"));
        assert!(msg.contains(MISSING_CREDENTIAL_MARKER));
        assert!(msg.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_insufficient_message() {
        let spec = ProviderKind::DeepSeek.spec();
        let msg = api(402, None, "Insufficient Balance").user_message(spec);
        assert!(msg.starts_with("⚠️"));
        assert!(msg.contains(INSUFFICIENT_CREDIT_MARKER));
        assert!(msg.contains("DeepSeek"));
        assert!(!msg.contains(PROVIDER_ERROR_MARKER));
    }

    #[test]
    fn test_generic_message_embeds_original() {
        let spec = ProviderKind::Gemini.spec();
        let msg = api(500, None, "backend exploded").user_message(spec);
        assert!(msg.starts_with(PROVIDER_ERROR_MARKER));
        assert!(msg.contains("Gemini"));
        assert!(msg.contains("backend exploded"));
    }

    #[test]
    fn test_empty_generation_message_is_fixed() {
        for kind in [ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::DeepSeek] {
            assert_eq!(
                ProviderError::EmptyGeneration.user_message(kind.spec()),
                COULD_NOT_SIMPLIFY
            );
        }
    }
}
