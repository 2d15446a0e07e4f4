use crate::correction::models::Unit;
use crate::docx::DocxDocument;

/// Decomposes a parsed document into ordered correctable units.
///
/// Paragraphs whose trimmed text is empty are skipped; `index` is the
/// ordinal among the retained paragraphs in traversal order. Style and
/// alignment are copied without interpretation.
pub fn extract_units(doc: &DocxDocument) -> Vec<Unit> {
    doc.paragraphs
        .iter()
        .filter(|p| !p.text.trim().is_empty())
        .enumerate()
        .map(|(index, p)| Unit::new(index, p.text.clone(), p.style_id.clone(), p.alignment.clone()))
        .collect()
}
