use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::config::{Config, SamplingConfig};
use crate::error::{AppResult, ExtractionError};
use crate::extract::{extract, Shape};
use crate::llm::CompletionBackend;
use crate::prompts::{literature_task, LITERATURE_SYSTEM_PROMPT};

/// Literature-analysis workflow: dataset context in, an opaque structured
/// literature summary out.
pub struct LiteratureAnalysis {
    backend: Arc<dyn CompletionBackend>,
    sampling: SamplingConfig,
}

impl LiteratureAnalysis {
    /// Create a new literature-analysis workflow
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &Config) -> Self {
        Self {
            backend,
            sampling: config.sampling.clone(),
        }
    }

    /// Summarize the literature relevant to the dataset.
    pub async fn run(&self, context: &str) -> AppResult<Value> {
        let start = Instant::now();
        let user_prompt = format!("{}\n{}", context, literature_task());

        let response = self
            .backend
            .complete(LITERATURE_SYSTEM_PROMPT, &user_prompt, &self.sampling)
            .await?;

        let analysis = extract(&response, Shape::Object).ok_or(ExtractionError::Unrecoverable {
            expected: Shape::Object.name(),
        })?;

        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            "Literature analysis completed"
        );

        Ok(analysis)
    }
}
