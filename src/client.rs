//! Ollama HTTP API client
//!
//! The daemon only needs to expose two operations for provisioning: listing
//! installed models (`GET /api/tags`) and pulling one (`POST /api/pull`).
//! Both sit behind the [`ModelService`] trait so tests can inject fakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// A model the daemon reports as installed
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InstalledModel {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// The subset of the Ollama API that provisioning depends on
#[async_trait]
pub trait ModelService: Send + Sync {
    /// List installed models. Also doubles as the readiness probe.
    async fn list(&self) -> Result<Vec<InstalledModel>>;

    /// Pull a model by name, blocking until the download completes
    async fn pull(&self, model: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    status: String,
}

/// HTTP client for a single Ollama daemon
pub struct OllamaClient {
    host: String,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the daemon at `host` (e.g. `http://localhost:11434`)
    ///
    /// No request timeout is set: model pulls can legitimately take many
    /// minutes, and readiness probing is bounded by the retry budget instead.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl ModelService for OllamaClient {
    async fn list(&self) -> Result<Vec<InstalledModel>> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach Ollama at {}", self.host))?;

        if !response.status().is_success() {
            anyhow::bail!("List request returned status: {}", response.status());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse model list response")?;

        Ok(tags.models)
    }

    async fn pull(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.host);
        let body = serde_json::json!({ "name": model, "stream": false });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Pull request for '{}' failed to reach Ollama", model))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Pull request for '{}' returned {}: {}", model, status, detail);
        }

        let pull: PullResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse pull response for '{}'", model))?;

        if pull.status != "success" {
            anyhow::bail!("Pull for '{}' ended with status '{}'", model, pull.status);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_host() {
        let client = OllamaClient::new("http://localhost:11434");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_tags_response_parsing() {
        // Shape returned by a real daemon, extra fields ignored
        let json = r#"{
            "models": [
                {
                    "name": "gemma2:2b",
                    "model": "gemma2:2b",
                    "modified_at": "2024-08-04T14:22:10.4808423-07:00",
                    "size": 1629518495,
                    "digest": "8ccf136fdd5298f3ffe2d69f75a500085e8321aeb8fe889635c0"
                }
            ]
        }"#;

        let tags: TagsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].name, "gemma2:2b");
        assert_eq!(tags.models[0].size, 1629518495);
    }

    #[test]
    fn test_tags_response_empty() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[test]
    fn test_pull_response_parsing() {
        let pull: PullResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert_eq!(pull.status, "success");
    }
}
