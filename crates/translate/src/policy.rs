use std::sync::Arc;

use img2txt_core::{TranslationRequest, SOURCE_LANGUAGE};

use crate::backend::TranslationBackend;

pub const NO_TEXT_DETECTED: &str = "No text detected.";

/// What to return when there is nothing to translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyInput {
    /// Return this message instead of the (blank) input.
    Message(String),
    /// Return the input untouched.
    Passthrough,
}

/// What to return when the backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// `"Translation Error: {err}"`, shown to the user.
    Surface,
    /// The untranslated input; the error is only logged.
    Fallback,
}

/// Short-circuit and failure rules shared by every front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPolicy {
    pub on_empty: EmptyInput,
    /// Targets equal to this code are returned unchanged without a backend call.
    pub passthrough_language: Option<String>,
    pub on_failure: OnFailure,
}

impl TranslationPolicy {
    /// Web UI rules: explain empty input, treat English as a no-op, show errors.
    pub fn interactive() -> Self {
        Self {
            on_empty: EmptyInput::Message(NO_TEXT_DETECTED.to_string()),
            passthrough_language: Some(SOURCE_LANGUAGE.code.to_string()),
            on_failure: OnFailure::Surface,
        }
    }

    /// Command-line rules: echo blank input, always call the backend, degrade silently.
    pub fn batch() -> Self {
        Self {
            on_empty: EmptyInput::Passthrough,
            passthrough_language: None,
            on_failure: OnFailure::Fallback,
        }
    }
}

/// A translation backend plus the policy that wraps it.
#[derive(Clone)]
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    policy: TranslationPolicy,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>, policy: TranslationPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &TranslationPolicy {
        &self.policy
    }

    /// Never fails; the policy decides what a failure looks like.
    pub async fn translate(&self, text: &str, target: &str) -> String {
        if text.trim().is_empty() {
            return match &self.policy.on_empty {
                EmptyInput::Message(msg) => msg.clone(),
                EmptyInput::Passthrough => text.to_string(),
            };
        }
        if self.policy.passthrough_language.as_deref() == Some(target) {
            return text.to_string();
        }

        match self
            .backend
            .translate(text, TranslationRequest::AUTO_SOURCE, target)
            .await
        {
            Ok(translated) => translated,
            Err(e) => match self.policy.on_failure {
                OnFailure::Surface => {
                    tracing::warn!(target_language = target, "Translation failed: {e}");
                    format!("Translation Error: {e}")
                }
                OnFailure::Fallback => {
                    tracing::warn!(target_language = target, "Translation error: {e}");
                    text.to_string()
                }
            },
        }
    }

    pub async fn translate_request(&self, request: &TranslationRequest) -> String {
        self.translate(&request.source_text, &request.target_language).await
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator").field("policy", &self.policy).finish_non_exhaustive()
    }
}
