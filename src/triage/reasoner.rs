use serde::{Deserialize, Serialize};

use super::TriageError;

/// External reasoning capability used for primary inference.
///
/// The call may be slow or fail outright; the orchestrator treats both the
/// same way and falls back. Implementations enforce their own timeout.
pub trait Reasoner {
    fn infer(&self, system: &str, prompt: &str) -> Result<String, TriageError>;
}

/// HTTP client for a local Ollama instance serving the reasoning model.
pub struct OllamaReasoner {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaReasoner {
    /// Create a reasoner pointing at an Ollama instance.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434.
    pub fn default_local(model: &str) -> Self {
        Self::new(
            "http://localhost:11434",
            model,
            crate::config::DEFAULT_REASONER_TIMEOUT_SECS,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_model_available(&self) -> Result<bool, TriageError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(&self.model)))
    }

    pub fn list_models(&self) -> Result<Vec<String>, TriageError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                TriageError::Connection(self.base_url.clone())
            } else {
                TriageError::Client(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TriageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| TriageError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl Reasoner for OllamaReasoner {
    fn infer(&self, system: &str, prompt: &str) -> Result<String, TriageError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                TriageError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                TriageError::Timeout(self.timeout_secs)
            } else {
                TriageError::Client(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TriageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| TriageError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}
