//! Correction Oracle Adapter — the boundary to the external LLM correction
//! capability, with an explicit retry policy for timeout-class failures.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::correction::prompts::{build_correction_prompt, CORRECTION_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// External text-correction capability, called once per unit.
///
/// Implementations are instructed to apply at most grammar/spelling and
/// punctuation changes — the similarity gate downstream is the enforcement
/// backstop, not the adapter.
#[async_trait]
pub trait CorrectionOracle: Send + Sync {
    async fn correct(
        &self,
        text: &str,
        protected_terms: &[String],
        uppercase_tokens: &[String],
    ) -> Result<String, LlmError>;
}

/// Retry contract for oracle calls: fixed inter-attempt delay up to a hard
/// wall-clock budget. Only timeout-class failures are retried; content
/// errors are terminal for the unit.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub wait_between: Duration,
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wait_between: Duration::from_secs(2),
            budget: Duration::from_secs(180),
        }
    }
}

/// Terminal oracle failure, after the retry policy is exhausted.
/// Always handled as a unit-level fallback, never a pipeline abort.
#[derive(Debug, Error)]
pub enum OracleFailure {
    #[error("correction call still timing out after {0:?} budget")]
    Timeout(Duration),

    #[error("correction call failed: {0}")]
    Call(String),
}

/// Calls the oracle under the given retry policy.
pub async fn correct_with_retry(
    oracle: &dyn CorrectionOracle,
    policy: &RetryPolicy,
    text: &str,
    protected_terms: &[String],
    uppercase_tokens: &[String],
) -> Result<String, OracleFailure> {
    let deadline = tokio::time::Instant::now() + policy.budget;

    loop {
        match oracle.correct(text, protected_terms, uppercase_tokens).await {
            Ok(candidate) => return Ok(candidate),
            Err(err) if err.is_timeout_class() => {
                if tokio::time::Instant::now() + policy.wait_between >= deadline {
                    return Err(OracleFailure::Timeout(policy.budget));
                }
                debug!("Timeout-class oracle failure, retrying: {err}");
                tokio::time::sleep(policy.wait_between).await;
            }
            Err(err) => return Err(OracleFailure::Call(err.to_string())),
        }
    }
}

/// Production oracle backed by the LLM client.
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CorrectionOracle for LlmOracle {
    async fn correct(
        &self,
        text: &str,
        protected_terms: &[String],
        uppercase_tokens: &[String],
    ) -> Result<String, LlmError> {
        let prompt = build_correction_prompt(text, protected_terms, uppercase_tokens);
        let response = self.client.call(&prompt, CORRECTION_SYSTEM).await?;
        let reply = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(sanitize_reply(reply).to_string())
    }
}

/// Strips the echoed prompt label and markdown fences some models wrap
/// replies in, despite instructions.
fn sanitize_reply(reply: &str) -> &str {
    let mut reply = reply.trim();

    if let Some((_, after)) = reply.split_once("CORRECTED TEXT:") {
        reply = after.trim();
    }

    if let Some(stripped) = reply.strip_prefix("```") {
        let stripped = stripped.strip_prefix("text").unwrap_or(stripped);
        reply = stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim());
    }

    reply
}
