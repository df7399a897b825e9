use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;

/// Document kind declared to the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Pdf,
    Image,
}

impl ExtractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// Error type for extraction-service calls.
#[derive(Debug)]
pub enum ExtractError {
    /// No endpoint configured (neither env vars nor config file)
    NotConfigured,
    /// Network/transport error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body was not the expected JSON shape
    Parse(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(
                f,
                "extraction service not configured — run `dcla extract login` or set DECLARA_EXTRACT_URL"
            ),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Http(code, msg) => write!(f, "service returned HTTP {}: {}", code, msg),
            Self::Parse(msg) => write!(f, "cannot parse service response: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    #[serde(rename = "fileBase64")]
    file_base64: String,
    filename: &'a str,
    kind: &'static str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(rename = "extractedData")]
    extracted_data: serde_json::Value,
}

/// Extraction service client (blocking).
#[derive(Clone)]
pub struct ExtractClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
}

impl ExtractClient {
    /// Create a client from saved/environment configuration.
    pub fn from_saved_config() -> Result<Self, ExtractError> {
        let config = crate::config::load_config().ok_or(ExtractError::NotConfigured)?;
        Ok(Self::new(config))
    }

    /// Create a client with explicit configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("dcla/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            endpoint: config.endpoint,
            token: config.token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one document and return the service's `extractedData` object.
    ///
    /// A single attempt: failures are returned, never retried here.
    pub fn extract(
        &self,
        content: &[u8],
        filename: &str,
        kind: ExtractKind,
        mime_type: &str,
    ) -> Result<serde_json::Value, ExtractError> {
        let request = ExtractRequest {
            file_base64: base64::engine::general_purpose::STANDARD.encode(content),
            filename,
            kind: kind.as_str(),
            mime_type,
        };

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body: serde_json::Value = response.json().unwrap_or(serde_json::Value::Null);
            let msg = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("no detail")
                .to_string();
            return Err(ExtractError::Http(status, msg));
        }

        let parsed: ExtractResponse = response
            .json()
            .map_err(|e| ExtractError::Parse(e.to_string()))?;
        Ok(parsed.extracted_data)
    }
}
