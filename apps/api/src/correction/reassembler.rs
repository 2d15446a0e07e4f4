use tracing::warn;

use crate::correction::models::Unit;
use crate::docx::{DocxParagraph, StyleRegistry};

/// Rebuilds output paragraphs from corrected units, one paragraph per unit
/// in index order.
///
/// A style id the registry does not know falls back to the document default —
/// logged, never an error. Alignment is copied verbatim.
pub fn reassemble(units: &[Unit], styles: &StyleRegistry) -> Vec<DocxParagraph> {
    units
        .iter()
        .map(|unit| {
            let style_id = match &unit.style_id {
                Some(id) if styles.contains(id) => Some(id.clone()),
                Some(id) => {
                    warn!(
                        "Style '{id}' not found in registry; unit {} falls back to default",
                        unit.index
                    );
                    None
                }
                None => None,
            };
            DocxParagraph {
                text: unit.corrected_text.clone(),
                style_id,
                alignment: unit.alignment.clone(),
            }
        })
        .collect()
}
