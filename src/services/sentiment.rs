use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::sentiment::SentimentConfig;
use crate::modules::analysis::model::AnalysisRequest;
use crate::modules::analysis::schema::{RawAnalyzerResponse, SentimentPayload};

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Sentiment engine returned {status}")]
    Upstream { status: u16, body: Value },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SentimentError {
    pub fn details(&self) -> Value {
        match self {
            SentimentError::Upstream { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct SentimentClient {
    client: Client,
    url: String,
    document: u32,
}

impl SentimentClient {
    pub fn new(config: &SentimentConfig) -> Result<Self, SentimentError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            url: config.url(),
            document: config.document_id,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> u32 {
        self.document
    }

    /// Sends one request to the engine. Failures are not retried.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<RawAnalyzerResponse, SentimentError> {
        let builder = match request {
            AnalysisRequest::Text { document, text } => {
                debug!(document, chars = text.len(), "Sending text corpus to sentiment engine");
                self.client
                    .post(&self.url)
                    .json(&SentimentPayload { document, text: &text })
            }
            AnalysisRequest::Images { document, images } => {
                debug!(document, images = images.len(), "Sending image batch to sentiment engine");
                let mut form = Form::new().text("document", document.to_string());
                for image in images {
                    let part = Part::bytes(image.bytes)
                        .file_name(image.file_name)
                        .mime_str(&image.content_type)
                        .map_err(|e| SentimentError::InvalidRequest(e.to_string()))?;
                    form = form.part("file", part);
                }
                self.client.post(&self.url).multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<Value>(&error_text)
                .unwrap_or_else(|_| Value::String(error_text));
            warn!(status = status.as_u16(), "Sentiment engine rejected request");
            return Err(SentimentError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let raw = serde_json::from_str::<Value>(&text)
            .map_err(|e| SentimentError::InvalidResponse(e.to_string()))?;

        Ok(RawAnalyzerResponse(raw))
    }
}
