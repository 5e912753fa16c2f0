//! Agent: pluggable inference collaborator that turns a prompt into text.
//!
//! `ClaudeAgent` calls the Anthropic API; `StubAgent` returns a placeholder
//! prediction for dry runs. The processor only sees `dyn Agent`.
//!
//! An agent never fails: a broken call comes back as text starting with
//! `ERROR_MARKER`, and that text is stored like any other response.

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::LlmClient;
use crate::models::DimensionPrediction;

pub const ERROR_MARKER: &str = "Error occurred: ";

#[async_trait]
pub trait Agent: Send + Sync {
    async fn respond(&self, prompt: &str, system: Option<&str>) -> String;

    fn name(&self) -> &str;
}

/// True when `response` is the error text produced by a failed call.
pub fn is_error_response(response: &str) -> bool {
    response.starts_with(ERROR_MARKER)
}

// ────────────────────────────────────────────────────────────────────────────
// ClaudeAgent
// ────────────────────────────────────────────────────────────────────────────

pub struct ClaudeAgent(pub LlmClient);

#[async_trait]
impl Agent for ClaudeAgent {
    async fn respond(&self, prompt: &str, system: Option<&str>) -> String {
        match self.0.complete(prompt, system).await {
            Ok(text) => text,
            Err(e) => {
                warn!("LLM call failed: {e}");
                format!("{ERROR_MARKER}{e}")
            }
        }
    }

    fn name(&self) -> &str {
        self.0.model()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// StubAgent
// ────────────────────────────────────────────────────────────────────────────

/// Answers every prompt with the same placeholder prediction as JSON.
pub struct StubAgent {
    prediction: DimensionPrediction,
}

impl Default for StubAgent {
    fn default() -> Self {
        Self {
            prediction: DimensionPrediction {
                length: 10.0,
                width: 5.0,
                height: 2.0,
                weight: 0.5,
                confidence_score: 0.85,
            },
        }
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn respond(&self, _prompt: &str, _system: Option<&str>) -> String {
        match serde_json::to_string(&self.prediction) {
            Ok(json) => json,
            Err(e) => format!("{ERROR_MARKER}{e}"),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}
