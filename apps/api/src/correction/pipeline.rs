//! Correction pipeline — orchestrates the full per-unit flow.
//!
//! Flow: extract_units → (per unit) guard_terms → oracle with retry →
//!       similarity gate → reconcile → diff → report.
//!
//! Units are processed sequentially and independently; a failed or rejected
//! unit keeps its original text and the run continues. Progress reporting is
//! an optional callback so the pipeline stays usable headlessly.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::correction::diff::extract_edits;
use crate::correction::extractor::extract_units;
use crate::correction::models::{CorrectionOutcome, Unit};
use crate::correction::oracle::{correct_with_retry, CorrectionOracle, RetryPolicy};
use crate::correction::reconciler::reconcile;
use crate::correction::similarity::{similarity_ratio, SIMILARITY_THRESHOLD};
use crate::correction::term_guard::guard_terms;
use crate::docx::DocxDocument;

/// Units shorter than this bypass the oracle entirely — not worth a round trip.
const MIN_CORRECTABLE_CHARS: usize = 5;

/// Invoked after each unit reaches a terminal state, as `(completed, total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Tuning for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub protected_terms: Vec<String>,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn new(protected_terms: Vec<String>) -> Self {
        Self {
            protected_terms,
            retry: RetryPolicy::default(),
        }
    }
}

/// The result of one pipeline run: every unit in input order plus summary
/// counts. The caller owns persistence — the pipeline keeps no state between
/// invocations.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub units: Vec<Unit>,
    pub units_changed: usize,
    pub total_edits: usize,
}

/// Runs the correction pipeline over a parsed document.
///
/// When `cancel` is set mid-run, remaining units keep their original text
/// and the report still covers every unit, so the output document can be
/// reassembled in full.
pub async fn run_pipeline(
    oracle: &dyn CorrectionOracle,
    settings: &PipelineSettings,
    doc: &DocxDocument,
    progress: Option<ProgressFn<'_>>,
    cancel: Option<&AtomicBool>,
) -> PipelineReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    let mut units = extract_units(doc);
    let total = units.len();
    info!("Correction run {run_id}: {total} units to process");

    for (done, unit) in units.iter_mut().enumerate() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            warn!("Correction run {run_id} cancelled after {done} of {total} units");
            break;
        }

        correct_unit(oracle, settings, unit).await;

        if let Some(report_progress) = progress {
            report_progress(done + 1, total);
        }
    }

    let units_changed = units
        .iter()
        .filter(|u| u.outcome == CorrectionOutcome::Corrected)
        .count();
    let total_edits = units.iter().map(Unit::change_count).sum();

    info!("Correction run {run_id} finished: {units_changed} of {total} units changed");

    PipelineReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        units,
        units_changed,
        total_edits,
    }
}

/// Corrects a single unit in place. Never fails the run — a terminal oracle
/// failure or a gate rejection falls back to the original text.
async fn correct_unit(oracle: &dyn CorrectionOracle, settings: &PipelineSettings, unit: &mut Unit) {
    if unit.original_text.chars().count() < MIN_CORRECTABLE_CHARS {
        return;
    }

    let guard = guard_terms(&unit.original_text, &settings.protected_terms);

    let candidate = match correct_with_retry(
        oracle,
        &settings.retry,
        &unit.original_text,
        &settings.protected_terms,
        &guard.uppercase_tokens,
    )
    .await
    {
        Ok(candidate) => candidate,
        Err(failure) => {
            warn!("Unit {} correction failed: {failure}", unit.index);
            unit.outcome = CorrectionOutcome::Failed;
            return;
        }
    };

    let ratio = similarity_ratio(&unit.original_text, &candidate);
    if ratio < SIMILARITY_THRESHOLD {
        warn!(
            "Unit {} correction rejected: similarity {ratio:.2} below threshold",
            unit.index
        );
        unit.outcome = CorrectionOutcome::Rejected;
        return;
    }

    let reconciled = reconcile(&unit.original_text, &candidate, &guard);
    if reconciled == unit.original_text {
        return;
    }

    unit.edits = extract_edits(&unit.original_text, &reconciled);
    unit.corrected_text = reconciled;
    unit.outcome = CorrectionOutcome::Corrected;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::correction::term_guard::DEFAULT_PROTECTED_TERMS;
    use crate::docx::{DocxParagraph, StyleRegistry};
    use crate::llm_client::LlmError;

    fn doc(texts: &[&str]) -> DocxDocument {
        DocxDocument {
            paragraphs: texts
                .iter()
                .map(|t| DocxParagraph {
                    text: t.to_string(),
                    style_id: None,
                    alignment: None,
                })
                .collect(),
            styles: StyleRegistry::default(),
        }
    }

    fn settings() -> PipelineSettings {
        PipelineSettings::new(
            DEFAULT_PROTECTED_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        )
    }

    /// Echoes every unit back unchanged, counting calls.
    struct EchoOracle {
        calls: AtomicUsize,
    }

    impl EchoOracle {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CorrectionOracle for EchoOracle {
        async fn correct(
            &self,
            text: &str,
            _protected_terms: &[String],
            _uppercase_tokens: &[String],
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.to_string())
        }
    }

    /// Returns a scripted candidate per original text; echoes when unscripted.
    struct MappingOracle {
        replies: HashMap<String, String>,
    }

    impl MappingOracle {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                replies: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl CorrectionOracle for MappingOracle {
        async fn correct(
            &self,
            text: &str,
            _protected_terms: &[String],
            _uppercase_tokens: &[String],
        ) -> Result<String, LlmError> {
            Ok(self.replies.get(text).cloned().unwrap_or_else(|| text.to_string()))
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl CorrectionOracle for FailingOracle {
        async fn correct(
            &self,
            _text: &str,
            _protected_terms: &[String],
            _uppercase_tokens: &[String],
        ) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 400,
                message: "no service".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_noop_oracle_round_trips_every_unit() {
        let doc = doc(&[
            "Primeiro parágrafo.",
            "Segundo parágrafo inteiro.",
            "Ela atravessou a ponte de pedra.",
        ]);
        let oracle = EchoOracle::new();

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        assert_eq!(report.units.len(), 3);
        for unit in &report.units {
            assert_eq!(unit.corrected_text, unit.original_text);
            assert_eq!(unit.outcome, CorrectionOutcome::Unchanged);
            assert!(unit.edits.is_empty());
        }
        assert_eq!(report.units_changed, 0);
        assert_eq!(report.total_edits, 0);
    }

    #[tokio::test]
    async fn test_short_units_bypass_the_oracle() {
        let doc = doc(&["Oi.", "Um parágrafo longo o bastante."]);
        let oracle = EchoOracle::new();

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        // Only the long unit reached the oracle
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.units[0].corrected_text, "Oi.");
        assert!(report.units[0].edits.is_empty());
        assert_eq!(report.units[0].outcome, CorrectionOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_accepted_correction_produces_edits_and_counts() {
        let doc = doc(&["O time fes a entrega ontem"]);
        let oracle = MappingOracle::new(&[("O time fes a entrega ontem", "O time fez a entrega ontem.")]);

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        let unit = &report.units[0];
        assert_eq!(unit.outcome, CorrectionOutcome::Corrected);
        assert_eq!(unit.corrected_text, "O time fez a entrega ontem.");
        assert!(unit.change_count() > 0);
        assert_eq!(report.units_changed, 1);
        assert_eq!(report.total_edits, unit.change_count());
    }

    #[tokio::test]
    async fn test_unrelated_rewrite_is_rejected() {
        let doc = doc(&["O relatório anual está pronto"]);
        let oracle = MappingOracle::new(&[(
            "O relatório anual está pronto",
            "I cannot help with that request, sorry about it.",
        )]);

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        let unit = &report.units[0];
        assert_eq!(unit.outcome, CorrectionOutcome::Rejected);
        assert_eq!(unit.corrected_text, unit.original_text);
        assert!(unit.edits.is_empty());
        assert_eq!(report.units_changed, 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back_per_unit() {
        let doc = doc(&["Primeiro parágrafo completo.", "Segundo parágrafo completo."]);

        let report = run_pipeline(&FailingOracle, &settings(), &doc, None, None).await;

        assert_eq!(report.units.len(), 2);
        for unit in &report.units {
            assert_eq!(unit.outcome, CorrectionOutcome::Failed);
            assert_eq!(unit.corrected_text, unit.original_text);
        }
    }

    #[tokio::test]
    async fn test_protected_terms_survive_the_full_pipeline() {
        let doc = doc(&["Bem vindo à APONTE hoje"]);
        let oracle =
            MappingOracle::new(&[("Bem vindo à APONTE hoje", "Bem-vindo à aponte hoje.")]);

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        let unit = &report.units[0];
        assert_eq!(unit.outcome, CorrectionOutcome::Corrected);
        assert!(unit.corrected_text.contains("APONTE"));
    }

    #[tokio::test]
    async fn test_empty_paragraphs_are_skipped_and_order_is_preserved() {
        let doc = doc(&["", "Unidade A completa.", "  ", "Unidade B completa."]);
        let oracle = EchoOracle::new();

        let report = run_pipeline(&oracle, &settings(), &doc, None, None).await;

        assert_eq!(report.units.len(), 2);
        assert_eq!(report.units[0].index, 0);
        assert_eq!(report.units[0].original_text, "Unidade A completa.");
        assert_eq!(report.units[1].index, 1);
        assert_eq!(report.units[1].original_text, "Unidade B completa.");
    }

    #[tokio::test]
    async fn test_progress_callback_fires_once_per_unit() {
        let doc = doc(&["Primeira unidade longa.", "Segunda unidade longa.", "Oi."]);
        let oracle = EchoOracle::new();
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_in_callback = Arc::clone(&seen);
        let progress: ProgressFn<'_> = &move |done, total| {
            seen_in_callback.lock().unwrap().push((done, total));
        };

        run_pipeline(&oracle, &settings(), &doc, Some(progress), None).await;

        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_cancellation_keeps_remaining_units_original() {
        let doc = doc(&["Primeira unidade longa.", "Segunda unidade longa."]);
        let oracle = EchoOracle::new();
        let cancel = AtomicBool::new(true);

        let report = run_pipeline(&oracle, &settings(), &doc, None, Some(&cancel)).await;

        // No unit was sent to the oracle, every unit is still in the report
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.units.len(), 2);
        for unit in &report.units {
            assert_eq!(unit.outcome, CorrectionOutcome::Unchanged);
            assert_eq!(unit.corrected_text, unit.original_text);
        }
    }
}
