use std::env;

use super::{parse_var, ConfigError};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 3001u16)?;
        let max_upload_mb = parse_var("MAX_UPLOAD_MB", 25usize)?;

        Ok(Self {
            host,
            port,
            max_upload_bytes: upload_limit_bytes(max_upload_mb)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn upload_limit_bytes(megabytes: usize) -> Result<usize, ConfigError> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| ConfigError::Invalid {
            key: "MAX_UPLOAD_MB",
            value: megabytes.to_string(),
        })
}
