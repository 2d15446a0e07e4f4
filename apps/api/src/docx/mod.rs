//! Minimal OOXML (DOCX) reading and writing for the correction pipeline.
//!
//! Only what the pipeline needs is modeled: body paragraphs with their style
//! id, alignment, and literal text, plus the style registry carried verbatim
//! from the source package into the output. Tables, images, headers, and run
//! formatting are outside the correction contract.

mod reader;
mod writer;

pub use reader::read_docx;
pub use writer::write_docx;

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a DOCX package: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("missing document part: {0}")]
    MissingPart(&'static str),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to read document part: {0}")]
    Io(#[from] std::io::Error),
}

/// One body paragraph: literal text plus opaque formatting identifiers.
/// `style_id` and `alignment` are copied without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocxParagraph {
    pub text: String,
    pub style_id: Option<String>,
    pub alignment: Option<String>,
}

/// Style ids declared by the source package, plus the raw styles part so the
/// output document keeps the same definitions.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    ids: HashSet<String>,
    raw_xml: Option<String>,
}

impl StyleRegistry {
    pub fn new(ids: HashSet<String>, raw_xml: Option<String>) -> Self {
        Self { ids, raw_xml }
    }

    pub fn contains(&self, style_id: &str) -> bool {
        self.ids.contains(style_id)
    }

    pub fn raw_xml(&self) -> Option<&str> {
        self.raw_xml.as_deref()
    }
}

/// A parsed source document: ordered paragraphs plus the style registry.
/// Created once by the reader; the pipeline owns it for the whole run.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    pub paragraphs: Vec<DocxParagraph>,
    pub styles: StyleRegistry,
}
