//! Structured Document Correction Pipeline.
//!
//! Flow: extract units → (per unit) guard terms → oracle call → similarity
//! gate → reconcile protected terms → diff → reassemble document.
//!
//! Units are processed independently; a failed or rejected unit keeps its
//! original text and the run continues. Only a source document that cannot
//! be parsed aborts the whole pipeline.

pub mod diff;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod reassembler;
pub mod reconciler;
pub mod similarity;
pub mod term_guard;
