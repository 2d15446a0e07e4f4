//! Term Guard — captures protected terms and uppercase tokens from a unit's
//! original text so the reconciler can restore anything the oracle altered.
//!
//! Each protected-term occurrence is recorded with a ±10 character context
//! window. The window, not a fixed offset, is what lets the reconciler find
//! the (possibly shifted) position of the term in the corrected candidate.

use lazy_static::lazy_static;
use regex::Regex;

/// Default protected literal terms — the brand's case and spacing variants,
/// including the apostrophe-prefixed contractions.
pub const DEFAULT_PROTECTED_TERMS: &[&str] = &[
    "APONTE", "Aponte", "aponte", "A PONTE", "a ponte", "A ponte", "d'A PONTE", "d'APONTE",
    "d'Aponte", "d'aponte",
];

/// Width of the context window captured around each match, in characters.
const CONTEXT_PAD: usize = 10;

lazy_static! {
    static ref UPPERCASE_TOKEN: Regex = Regex::new(r"\b[A-Z]{2,}\b").unwrap();
}

/// One protected-term occurrence: the exact term matched and its
/// surrounding context in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermOccurrence {
    pub context: String,
    pub term: String,
}

/// Everything the reconciler needs to restore a unit's protected text.
/// Derived fresh per unit from the original text; never persisted.
#[derive(Debug, Clone, Default)]
pub struct TermGuard {
    pub occurrences: Vec<TermOccurrence>,
    pub uppercase_tokens: Vec<String>,
}

/// Scans `text` for configured protected terms and uppercase tokens.
///
/// Occurrences with an identical context window collapse into one record —
/// the last term scanned wins. Uppercase tokens are maximal runs of two or
/// more ASCII uppercase letters, word-bounded, deduplicated in order.
pub fn guard_terms(text: &str, protected_terms: &[String]) -> TermGuard {
    let mut occurrences: Vec<TermOccurrence> = Vec::new();

    for term in protected_terms {
        if term.is_empty() {
            continue;
        }
        for (start, matched) in text.match_indices(term.as_str()) {
            let context = char_window(text, start, start + matched.len(), CONTEXT_PAD).to_string();
            match occurrences.iter_mut().find(|occ| occ.context == context) {
                Some(existing) => existing.term = term.clone(),
                None => occurrences.push(TermOccurrence {
                    context,
                    term: term.clone(),
                }),
            }
        }
    }

    let mut uppercase_tokens: Vec<String> = Vec::new();
    for token in UPPERCASE_TOKEN.find_iter(text) {
        if !uppercase_tokens.iter().any(|t| t == token.as_str()) {
            uppercase_tokens.push(token.as_str().to_string());
        }
    }

    TermGuard {
        occurrences,
        uppercase_tokens,
    }
}

/// Expands the byte span `start..end` by `pad` characters on each side,
/// clipped to the text boundaries.
fn char_window(text: &str, start: usize, end: usize, pad: usize) -> &str {
    let window_start = text[..start]
        .char_indices()
        .rev()
        .take(pad)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let window_end = text[end..]
        .char_indices()
        .nth(pad)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[window_start..window_end]
}
