use similar::{DiffTag, TextDiff};

use crate::correction::models::{EditKind, EditOp};

/// Computes the ordered edit operations between original and corrected text.
///
/// The op stream covers both strings completely: concatenating the original
/// spans reconstructs the original, concatenating the corrected spans
/// reconstructs the corrected text.
pub fn extract_edits(original: &str, corrected: &str) -> Vec<EditOp> {
    let diff = TextDiff::from_chars(original, corrected);
    let original_chars: Vec<char> = original.chars().collect();
    let corrected_chars: Vec<char> = corrected.chars().collect();

    diff.ops()
        .iter()
        .map(|op| {
            let kind = match op.tag() {
                DiffTag::Equal => EditKind::Equal,
                DiffTag::Replace => EditKind::Replace,
                DiffTag::Delete => EditKind::Delete,
                DiffTag::Insert => EditKind::Insert,
            };
            EditOp {
                kind,
                original_span: original_chars[op.old_range()].iter().collect(),
                corrected_span: corrected_chars[op.new_range()].iter().collect(),
            }
        })
        .collect()
}
