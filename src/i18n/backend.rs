//! Translation backends.
//!
//! The HTTP backend speaks the LibreTranslate `/translate` contract:
//! POST `{ q, source, target, format: "text" }`, answer `{ translatedText }`.

use crate::http_error::{extract_error_message, HttpErrorShape};
use crate::i18n::Language;
use crate::retry::RetryDecision;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation backend rate limited the request (429)")]
    RateLimited,

    #[error("translation backend error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("translation request failed: {message}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("translation response was not understood: {0}")]
    Decode(String),
}

impl TranslateError {
    /// 429s wait out a cooldown without spending an attempt; everything else
    /// spends one.
    pub fn retry_decision(&self) -> RetryDecision {
        match self {
            TranslateError::RateLimited => RetryDecision::RateLimited,
            _ => RetryDecision::Retry,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(source: reqwest::Error) -> Self {
        let message = extract_error_message(&HttpErrorShape::from_reqwest(&source));
        TranslateError::Http { message, source }
    }
}

/// Something that turns text in one language into another.
pub trait TranslationBackend {
    fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> impl Future<Output = Result<String, TranslateError>> + Send;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// HTTP translation backend
#[derive(Debug, Clone)]
pub struct HttpTranslationBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslationBackend {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Build a client with a request timeout so a hung call cannot stall a
    /// chunk forever
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, endpoint))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TranslationBackend for HttpTranslationBackend {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        let request = TranslateRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            let shape = HttpErrorShape::from_status(status.as_u16(), &body);
            return Err(TranslateError::Status {
                status: status.as_u16(),
                message: extract_error_message(&shape),
            });
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Decode(e.to_string()))?;

        body.translated_text
            .ok_or_else(|| TranslateError::Decode("response has no translatedText".to_string()))
    }
}
