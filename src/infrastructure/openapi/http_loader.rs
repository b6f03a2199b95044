//! HTTP-based schema loader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::generation::{GenerationError, Result, SchemaDocument, SchemaLoader};

/// Loads OpenAPI documents from HTTP/HTTPS URLs
pub struct HttpSchemaLoader {
    client: Client,
}

impl HttpSchemaLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GenerationError::Load {
                location: "http".to_string(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

/// Last non-empty path segment of `url`, or its host for bare URLs
fn document_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(String::from)
        .or_else(|| url.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl SchemaLoader for HttpSchemaLoader {
    async fn load(&self, source: &str) -> Result<SchemaDocument> {
        let load_error = |message: String| GenerationError::Load {
            location: source.to_string(),
            message,
        };

        let url = Url::parse(source).map_err(|e| load_error(format!("Invalid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(load_error(format!(
                "HttpSchemaLoader only handles HTTP(S) URLs, got scheme '{}'",
                url.scheme()
            )));
        }

        tracing::debug!(url = %url, "Fetching OpenAPI document");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| load_error(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(load_error(format!("HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| load_error(format!("Failed to read response body: {e}")))?;

        Ok(SchemaDocument::new(document_name(&url), text))
    }
}
