//! Completion-backend client and types.
//!
//! The orchestration layer depends only on the [`CompletionBackend`] trait:
//! one opaque `complete(system, user, sampling) -> text` capability with no
//! retry and no streaming. [`CompletionClient`] is the HTTP implementation.

mod client;
mod types;

pub use client::CompletionClient;
pub use types::*;

use async_trait::async_trait;

use crate::config::SamplingConfig;
use crate::error::TransportResult;

/// The opaque text-completion capability the workflows call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the model's raw text output.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        sampling: &SamplingConfig,
    ) -> TransportResult<String>;
}
