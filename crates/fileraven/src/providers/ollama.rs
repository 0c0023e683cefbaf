//! Ollama embedding provider with retry logic

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, OllamaConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

const SERVICE: &str = "ollama";

/// Embeddings from a local Ollama server
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    /// Extra attempts after the first failed request
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(ollama: &OllamaConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ollama.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::external(SERVICE, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: ollama.base_url.trim_end_matches('/').to_string(),
            model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
            max_retries: ollama.max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run `operation` until it succeeds or `max_retries` extra attempts fail
    async fn with_retries<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        "[{}] Embedding attempt {} failed: {}; next try in {:?}",
                        self.model,
                        attempt + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::external(SERVICE, format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::external(
                SERVICE,
                format!("Embedding failed: HTTP {} - {}", status, body),
            ));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            Error::external(SERVICE, format!("Failed to parse embedding response: {}", e))
        })?;

        Ok(embed_response.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.with_retries(|| self.request_embedding(text)).await?;

        if embedding.len() != self.dimensions {
            return Err(Error::external(
                SERVICE,
                format!(
                    "Model {} returned {} dimensions, expected {}",
                    self.model,
                    embedding.len(),
                    self.dimensions
                ),
            ));
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// 1s, 2s, 4s, ... capped at one minute
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6)).min(Duration::from_secs(60))
}
