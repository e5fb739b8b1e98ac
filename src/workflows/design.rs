use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use super::Hypothesis;
use crate::config::{Config, SamplingConfig};
use crate::error::{AppResult, ExtractionError};
use crate::extract::{extract, Shape};
use crate::llm::CompletionBackend;
use crate::prompts::{design_task, DESIGN_SYSTEM_PROMPT};

/// Experimental-design workflow: one hypothesis in, a validation protocol
/// out. The protocol schema is a contract offered to the model; the result
/// is kept as an opaque validated-JSON document.
pub struct ExperimentalDesign {
    backend: Arc<dyn CompletionBackend>,
    sampling: SamplingConfig,
}

impl ExperimentalDesign {
    /// Create a new experimental-design workflow
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        Self {
            backend,
            sampling: config.sampling.clone(),
        }
    }

    /// Design a validation experiment for the given hypothesis.
    pub async fn run(&self, context: &str, hypothesis: &Hypothesis) -> AppResult<Value> {
        let start = Instant::now();
        let user_prompt = format!(
            "{}\n{}",
            context,
            design_task(&hypothesis.title, &hypothesis.statement)
        );

        let response = self
            .backend
            .complete(DESIGN_SYSTEM_PROMPT, &user_prompt, &self.sampling)
            .await?;

        let protocol = extract(&response, Shape::Object).ok_or(ExtractionError::Unrecoverable {
            expected: Shape::Object.name(),
        })?;

        info!(
            hypothesis = %hypothesis.title,
            latency_ms = start.elapsed().as_millis() as u64,
            "Experimental design completed"
        );

        Ok(protocol)
    }
}
