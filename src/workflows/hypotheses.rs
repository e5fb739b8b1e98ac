use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::{Hypothesis, HypothesisQuery};
use crate::config::{Config, SamplingConfig};
use crate::error::{AppResult, ExtractionError};
use crate::extract::{extract, Shape};
use crate::llm::CompletionBackend;
use crate::prompts::{hypothesis_task, HYPOTHESIS_SYSTEM_PROMPT};

/// Hypothesis-generation workflow: dataset context in, ranked hypotheses out.
pub struct HypothesisGeneration {
    backend: Arc<dyn CompletionBackend>,
    sampling: SamplingConfig,
}

impl HypothesisGeneration {
    /// Create a new hypothesis-generation workflow
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        Self {
            backend,
            sampling: config.sampling.clone(),
        }
    }

    /// Run one generation round. A ranked list of zero is not a valid
    /// result, so an empty salvage fails the same way an unsalvageable
    /// response does.
    pub async fn run(&self, context: &str, query: &HypothesisQuery) -> AppResult<Vec<Hypothesis>> {
        let start = Instant::now();
        let user_prompt = format!("{}\n{}", context, hypothesis_task(query.question()));

        let response = self
            .backend
            .complete(HYPOTHESIS_SYSTEM_PROMPT, &user_prompt, &self.sampling)
            .await?;

        let value = extract(&response, Shape::Array).ok_or(ExtractionError::Unrecoverable {
            expected: Shape::Array.name(),
        })?;

        // Elements that survived salvage but still do not look like a
        // hypothesis object are skipped, not fatal.
        let items = value.as_array().cloned().unwrap_or_default();
        let total = items.len();
        let hypotheses: Vec<Hypothesis> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if hypotheses.len() < total {
            warn!(
                discarded = total - hypotheses.len(),
                "Dropped salvaged elements that were not hypothesis objects"
            );
        }

        if hypotheses.is_empty() {
            return Err(ExtractionError::EmptyResult.into());
        }

        info!(
            hypotheses = hypotheses.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Hypothesis generation completed"
        );

        Ok(hypotheses)
    }
}
