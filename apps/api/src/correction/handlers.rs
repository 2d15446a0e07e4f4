use std::ffi::OsStr;
use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::correction::pipeline::{run_pipeline, PipelineReport, PipelineSettings};
use crate::correction::reassembler::reassemble;
use crate::docx::{read_docx, write_docx};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CorrectionResponse {
    pub file_name: String,
    /// The corrected DOCX package, base64-encoded.
    pub document_base64: String,
    pub report: PipelineReport,
}

/// POST /api/v1/corrections
///
/// Multipart upload (`file` part, DOCX bytes). Runs the correction pipeline
/// and returns the corrected document plus the audit report in one response —
/// the caller owns any persistence between invocations.
pub async fn handle_correct_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CorrectionResponse>, AppError> {
    let mut upload_name: Option<String> = None;
    let mut upload_bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            upload_name = field.file_name().map(str::to_string);
            upload_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?,
            );
        }
    }

    let upload_bytes = upload_bytes
        .ok_or_else(|| AppError::Validation("Missing 'file' field in multipart upload".to_string()))?;

    let doc = read_docx(&upload_bytes)?;

    let settings = PipelineSettings::new(state.config.protected_terms.clone());
    let progress: &(dyn Fn(usize, usize) + Send + Sync) =
        &|done, total| info!("Corrected unit {}/{}", done, total);

    let report = run_pipeline(state.oracle.as_ref(), &settings, &doc, Some(progress), None).await;

    let paragraphs = reassemble(&report.units, &doc.styles);
    let output = write_docx(&paragraphs, &doc.styles)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to assemble output document: {e}")))?;

    Ok(Json(CorrectionResponse {
        file_name: derive_output_name(upload_name.as_deref()),
        document_base64: BASE64.encode(&output),
        report,
    }))
}

/// `relatorio.docx` → `relatorio_corrigido.docx`
fn derive_output_name(original_name: Option<&str>) -> String {
    let base = original_name
        .map(Path::new)
        .and_then(Path::file_stem)
        .and_then(OsStr::to_str)
        .unwrap_or("documento");
    format!("{base}_corrigido.docx")
}
