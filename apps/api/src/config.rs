use anyhow::{Context, Result};

use crate::correction::term_guard::DEFAULT_PROTECTED_TERMS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Literal terms that must survive correction verbatim.
    pub protected_terms: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            protected_terms: parse_protected_terms(std::env::var("PROTECTED_TERMS").ok()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses the comma-separated PROTECTED_TERMS override.
/// Falls back to the built-in term list when unset or empty.
fn parse_protected_terms(raw: Option<String>) -> Vec<String> {
    let terms: Vec<String> = raw
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if terms.is_empty() {
        DEFAULT_PROTECTED_TERMS
            .iter()
            .map(|term| term.to_string())
            .collect()
    } else {
        terms
    }
}
