use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{validate, TranslateError, TranslationBackend};

/// Client for Google's public `translate_a/single` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        validate(text, target)?;
        tracing::debug!(source, target, chars = text.len(), "Requesting translation");

        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_response(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array whose first element lists
/// `[translated, original, …]` per sentence.
pub fn parse_response(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing sentence list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() && !segments.is_empty() {
        return Err(TranslateError::Malformed("no translated segments".to_string()));
    }
    Ok(translated)
}
