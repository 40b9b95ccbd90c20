//! HTTP speech-recognition client.
//!
//! Uploads a WAV utterance and reads back a transcript. Two response shapes
//! are understood: a plain `{"text": "..."}` object, and newline-delimited
//! streaming results where each line looks like
//! `{"result":[{"alternative":[{"transcript":"..."}]}]}`.

use crate::config::SttConfig;
use crate::defaults;
use crate::error::{NavError, Result};
use crate::http;
use crate::stt::recognizer::Recognizer;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpRecognizer {
    client: reqwest::Client,
    url: String,
    language: String,
    api_key: Option<String>,
}

impl HttpRecognizer {
    pub fn new(config: &SttConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(defaults::USER_AGENT, REQUEST_TIMEOUT)?,
            url: config.url.clone(),
            language: config.language.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(&self, wav: Vec<u8>) -> Result<Option<String>> {
        let mut query = vec![("lang", self.language.as_str()), ("output", "json")];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        tracing::debug!(url = %self.url, bytes = wav.len(), "uploading utterance");
        let response = self
            .client
            .post(&self.url)
            .query(&query)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(wav)
            .send()
            .await
            .map_err(|e| NavError::Recognition {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(NavError::Recognition {
                message: format!("service returned status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| NavError::Recognition {
            message: format!("failed to read response: {e}"),
        })?;
        Ok(parse_transcript(&body))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[derive(Deserialize)]
struct PlainResponse {
    text: String,
}

#[derive(Deserialize)]
struct StreamingLine {
    #[serde(default)]
    result: Vec<StreamingResult>,
}

#[derive(Deserialize)]
struct StreamingResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: String,
}

/// Extract the first non-empty transcript from a recognizer response body.
pub fn parse_transcript(body: &str) -> Option<String> {
    if let Ok(plain) = serde_json::from_str::<PlainResponse>(body) {
        let text = plain.text.trim();
        return (!text.is_empty()).then(|| text.to_string());
    }

    body.lines()
        .filter_map(|line| serde_json::from_str::<StreamingLine>(line.trim()).ok())
        .flat_map(|line| line.result)
        .flat_map(|result| result.alternative)
        .map(|alt| alt.transcript.trim().to_string())
        .find(|text| !text.is_empty())
}
