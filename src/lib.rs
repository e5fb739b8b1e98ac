//! # Metabolens
//!
//! A differential-metabolomics hypothesis engine: upload a CSV of
//! metabolite changes and obtain AI-generated scientific hypotheses, an
//! experimental-validation protocol, and a literature summary via a
//! chat-completion API.
//!
//! ## Features
//!
//! - **Tabular Ingest**: delimited-text parsing with per-cell numeric
//!   coercion and header-pattern column-role inference
//! - **Statistical Summary**: significance counts and ranked top-changed
//!   metabolites under a fixed predicate
//! - **Resilient Extraction**: best-effort recovery of structured JSON
//!   from truncated or malformed model responses
//! - **Three Workflows**: hypothesis generation, experimental design, and
//!   literature analysis, each a single-shot prompt-call-extract pipeline
//!
//! ## Architecture
//!
//! ```text
//! CSV upload → Ingest → Summary → Prompt Context
//!                                       ↓
//!            Session slots ← Extractor ← Completion API (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use metabolens::{Config, Session};
//! use metabolens::workflows::{HypothesisFocus, HypothesisQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let mut session = Session::new(config)?;
//!     session.load_dataset("metabolite,log2FC,p_value\nLactate,2.3,0.0001\n")?;
//!     let query = HypothesisQuery::from_parts(Some(HypothesisFocus::EnergyMetabolism), "");
//!     session.generate_hypotheses(query).await?;
//!     for h in session.hypotheses().unwrap_or_default() {
//!         println!("{}. {}", h.rank, h.title);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management loaded from the environment.
pub mod config;
/// Prompt-context rendering of the dataset summary.
pub mod context;
/// Error types and result aliases for the application.
pub mod error;
/// Resilient structured-response extraction from model output.
pub mod extract;
/// Tabular ingest and column-role inference.
pub mod ingest;
/// Completion-backend client and types.
pub mod llm;
/// System prompts and task instructions for the workflows.
pub mod prompts;
/// In-memory analysis session and per-workflow result slots.
pub mod session;
/// Deterministic statistical summarization.
pub mod stats;
/// The three single-shot analysis workflows.
pub mod workflows;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::Session;
