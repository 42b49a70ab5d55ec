use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Longest input the public endpoint accepts in one request.
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Unsupported language: '{0}'")]
    UnsupportedLanguage(String),
    #[error("Text is too long to translate ({0} chars, max {max})", max = MAX_TEXT_CHARS)]
    TooLong(usize),
    #[error("{0}")]
    Backend(String),
}

/// Abstraction over a machine-translation service.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` from `source` (a code or `"auto"`) into `target`.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Shared request validation for backends.
pub fn validate(text: &str, target: &str) -> Result<(), TranslateError> {
    if target.trim().is_empty() {
        return Err(TranslateError::UnsupportedLanguage(target.to_string()));
    }
    let chars = text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(TranslateError::TooLong(chars));
    }
    Ok(())
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a preset translation (or failure) and records every call.
pub struct MockTranslator {
    outcome: Result<String, String>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    pub fn new(translation: impl Into<String>) -> Self {
        Self { outcome: Ok(translation.into()), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()), calls: Mutex::new(Vec::new()) }
    }

    /// `(text, source, target)` of every call so far.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TranslationBackend for MockTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((text.to_string(), source.to_string(), target.to_string()));
        }
        self.outcome.clone().map_err(TranslateError::Backend)
    }
}
