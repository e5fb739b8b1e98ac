//! In-memory analysis session.
//!
//! Owns the uploaded dataset, the inferred column roles, the derived
//! summary, and one independent result slot per workflow. A slot holds the
//! latest successful result for its workflow and nothing else: it is
//! replaced only on full build-call-extract success, and a failed call
//! never touches the other slots. Two in-flight calls to the same workflow
//! are not queued or de-duplicated; the last response to settle wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::context::build_context;
use crate::error::{AppError, AppResult};
use crate::ingest::{infer_roles, parse_table, ColumnRoles, DataTable};
use crate::llm::{CompletionBackend, CompletionClient};
use crate::stats::{summarize, Summary};
use crate::workflows::{
    ExperimentalDesign, Hypothesis, HypothesisGeneration, HypothesisQuery, LiteratureAnalysis,
};

/// One researcher session: dataset state plus the three workflow slots.
pub struct Session {
    config: Config,
    backend: Option<Arc<dyn CompletionBackend>>,
    table: DataTable,
    roles: ColumnRoles,
    summary: Option<Summary>,
    hypotheses: Option<Vec<Hypothesis>>,
    protocol: Option<Value>,
    literature: Option<Value>,
}

impl Session {
    /// Create a session. The completion backend is only constructed when a
    /// credential is configured; without one, uploads and summaries still
    /// work and the workflows fail with a configuration error.
    pub fn new(config: Config) -> AppResult<Self> {
        let backend = match &config.llm.api_key {
            Some(key) => {
                let client = CompletionClient::new(key, &config.llm, &config.request)?;
                let backend: Arc<dyn CompletionBackend> = Arc::new(client);
                Some(backend)
            }
            None => None,
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Create a session with an explicit backend (the test seam).
    pub fn with_backend(config: Config, backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self {
            config,
            backend,
            table: DataTable::default(),
            roles: ColumnRoles::default(),
            summary: None,
            hypotheses: None,
            protocol: None,
            literature: None,
        }
    }

    /// Load a dataset from delimited text, replacing any previous one.
    /// Roles and summary are recomputed in full; workflow slots keep their
    /// previous results until a workflow succeeds again.
    pub fn load_dataset(&mut self, text: &str) -> AppResult<()> {
        let table = parse_table(text)?;
        let roles = infer_roles(&table.headers);
        let summary = summarize(&table.rows, &roles);

        info!(
            rows = table.rows.len(),
            columns = table.headers.len(),
            significant = summary.as_ref().map(|s| s.significant).unwrap_or(0),
            "Dataset loaded"
        );

        self.table = table;
        self.roles = roles;
        self.summary = summary;
        Ok(())
    }

    /// The loaded table.
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// Inferred column roles for the loaded table.
    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    /// Current dataset summary; `None` until a non-empty dataset is loaded.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Latest hypothesis-generation result.
    pub fn hypotheses(&self) -> Option<&[Hypothesis]> {
        self.hypotheses.as_deref()
    }

    /// Latest experimental-design result.
    pub fn protocol(&self) -> Option<&Value> {
        self.protocol.as_ref()
    }

    /// Latest literature-analysis result.
    pub fn literature(&self) -> Option<&Value> {
        self.literature.as_ref()
    }

    fn require_backend(&self) -> AppResult<Arc<dyn CompletionBackend>> {
        self.backend.clone().ok_or_else(|| AppError::Config {
            message: "METABOLENS_API_KEY is not set".to_string(),
        })
    }

    fn require_context(&self) -> AppResult<String> {
        let summary = self.summary.as_ref().ok_or_else(|| AppError::Internal {
            message: "no dataset loaded".to_string(),
        })?;
        Ok(build_context(&self.table.rows, summary))
    }

    /// Generate ranked hypotheses. A `None` query is the UI-level guard
    /// case: nothing is asked and nothing changes.
    pub async fn generate_hypotheses(&mut self, query: Option<HypothesisQuery>) -> AppResult<()> {
        let query = match query {
            Some(q) => q,
            None => {
                debug!("Hypothesis generation skipped: no focus or question selected");
                return Ok(());
            }
        };
        let backend = self.require_backend()?;
        let context = self.require_context()?;

        let workflow = HypothesisGeneration::new(backend, &self.config);
        let hypotheses = workflow.run(&context, &query).await?;
        self.hypotheses = Some(hypotheses);
        Ok(())
    }

    /// Design a validation experiment for one generated hypothesis.
    pub async fn design_experiment(&mut self, hypothesis: &Hypothesis) -> AppResult<()> {
        let backend = self.require_backend()?;
        let context = self.require_context()?;

        let workflow = ExperimentalDesign::new(backend, &self.config);
        let protocol = workflow.run(&context, hypothesis).await?;
        self.protocol = Some(protocol);
        Ok(())
    }

    /// Summarize the literature relevant to the loaded dataset.
    pub async fn analyze_literature(&mut self) -> AppResult<()> {
        let backend = self.require_backend()?;
        let context = self.require_context()?;

        let workflow = LiteratureAnalysis::new(backend, &self.config);
        let literature = workflow.run(&context).await?;
        self.literature = Some(literature);
        Ok(())
    }
}
