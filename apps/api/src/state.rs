use std::sync::Arc;

use crate::config::Config;
use crate::correction::oracle::CorrectionOracle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable correction oracle. Production: LlmOracle over the LLM client.
    pub oracle: Arc<dyn CorrectionOracle>,
    pub config: Config,
}
