use serde::{Deserialize, Serialize};

/// One correctable block of text from the source document.
///
/// `index` is the unit's ordinal among non-empty paragraphs and defines
/// output ordering. `style_id` and `alignment` are opaque formatting
/// identifiers — correction logic never interprets or modifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub index: usize,
    pub original_text: String,
    pub style_id: Option<String>,
    pub alignment: Option<String>,
    pub corrected_text: String,
    pub edits: Vec<EditOp>,
    pub outcome: CorrectionOutcome,
}

impl Unit {
    pub fn new(
        index: usize,
        original_text: String,
        style_id: Option<String>,
        alignment: Option<String>,
    ) -> Self {
        Self {
            index,
            corrected_text: original_text.clone(),
            original_text,
            style_id,
            alignment,
            edits: Vec::new(),
            outcome: CorrectionOutcome::Unchanged,
        }
    }

    /// Number of non-equal edit operations in this unit.
    pub fn change_count(&self) -> usize {
        self.edits.iter().filter(|op| op.is_change()).count()
    }
}

/// Per-unit disposition, tracked for the audit report.
///
/// A `Rejected` or `Failed` unit is indistinguishable from an `Unchanged`
/// one in the output document — the report is where the difference surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionOutcome {
    /// No correction was needed or applied.
    Unchanged,
    /// An oracle candidate passed the gate and was applied.
    Corrected,
    /// The candidate failed the similarity gate and was discarded.
    Rejected,
    /// The oracle call failed; the original text was kept.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// One edit operation between original and corrected text.
/// Used only for reporting — never fed back into correction logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOp {
    pub kind: EditKind,
    pub original_span: String,
    pub corrected_span: String,
}

impl EditOp {
    pub fn is_change(&self) -> bool {
        self.kind != EditKind::Equal
    }
}
