use std::env;
use std::time::Duration;

use super::{parse_var, ConfigError};

pub const DEFAULT_DOCUMENT_ID: u32 = 1;

#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub document_id: u32,
}

impl SentimentConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: "/sentiment".to_string(),
            timeout: Duration::from_secs(30),
            document_id: DEFAULT_DOCUMENT_ID,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("SENTIMENT_API_URL").unwrap_or_else(|_| "http://0.0.0.0:8000".to_string());
        let endpoint = env::var("SENTIMENT_ENDPOINT").unwrap_or_else(|_| "/sentiment".to_string());
        let timeout_secs = parse_var("SENTIMENT_TIMEOUT_SECS", 30u64)?;
        let document_id = parse_var("SENTIMENT_DOCUMENT_ID", DEFAULT_DOCUMENT_ID)?;

        Ok(Self {
            base_url,
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            document_id,
        })
    }

    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.endpoint.starts_with('/') {
            format!("{}{}", base, self.endpoint)
        } else {
            format!("{}/{}", base, self.endpoint)
        }
    }
}
