//! Ollama HTTP client.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use tracklab_core::config::OllamaConfig;
use tracklab_core::error::{Result, TrackLabError};

/// Thin client for the Ollama generate API.
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            base_url: config.base_url(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a single non-streaming completion and return the raw reply text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                TrackLabError::Ollama(format!("connection failed ({}): {e}", self.base_url))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(TrackLabError::Ollama(format!("HTTP {status}: {text}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| TrackLabError::Ollama(format!("invalid response body: {e}")))?;
        Ok(json["response"].as_str().unwrap_or("").to_string())
    }

    /// Connectivity and model-availability diagnostics. Never errors —
    /// always returns a report the status endpoint can render.
    pub async fn health(&self) -> OllamaHealth {
        let version_resp = self
            .client
            .get(format!("{}/api/version", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        let resp = match version_resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => return OllamaHealth::unavailable(&self.model, format!("HTTP {}", r.status())),
            Err(_) => return OllamaHealth::unavailable(&self.model, "Cannot connect to Ollama".into()),
        };

        let version = resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v["version"].as_str().map(String::from))
            .unwrap_or_else(|| "unknown".into());

        let models: Vec<String> = match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(r) => r
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v["models"].as_array().map(|arr| {
                        arr.iter()
                            .filter_map(|m| m["name"].as_str().map(String::from))
                            .collect()
                    })
                })
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        let model_loaded = models.iter().any(|m| m.contains(&self.model));
        OllamaHealth {
            available: true,
            version: Some(version),
            model: self.model.clone(),
            model_loaded,
            models,
            error: None,
        }
    }
}

/// Result of an Ollama health probe.
#[derive(Debug, Clone, Serialize)]
pub struct OllamaHealth {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub model: String,
    pub model_loaded: bool,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OllamaHealth {
    fn unavailable(model: &str, error: String) -> Self {
        Self {
            available: false,
            version: None,
            model: model.to_string(),
            model_loaded: false,
            models: Vec::new(),
            error: Some(error),
        }
    }
}
