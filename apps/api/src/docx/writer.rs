use std::fmt::Write as _;
use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{DocxError, DocxParagraph, StyleRegistry};

const WORDPROCESSINGML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Fallback styles part for sources that carried none of their own.
const DEFAULT_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#;

/// Assembles a DOCX package from output paragraphs.
///
/// The source's styles part is carried over verbatim so paragraph style ids
/// keep their original definitions.
pub fn write_docx(
    paragraphs: &[DocxParagraph],
    styles: &StyleRegistry,
) -> Result<Vec<u8>, DocxError> {
    let document_xml = render_document_xml(paragraphs);
    let styles_xml = styles.raw_xml().unwrap_or(DEFAULT_STYLES_XML);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/styles.xml", styles_xml),
        ("word/document.xml", document_xml.as_str()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn render_document_xml(paragraphs: &[DocxParagraph]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<w:document xmlns:w="{WORDPROCESSINGML_NS}"><w:body>"#);

    for paragraph in paragraphs {
        xml.push_str("<w:p>");
        if paragraph.style_id.is_some() || paragraph.alignment.is_some() {
            xml.push_str("<w:pPr>");
            if let Some(style_id) = &paragraph.style_id {
                let _ = write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape(style_id));
            }
            if let Some(alignment) = &paragraph.alignment {
                let _ = write!(xml, r#"<w:jc w:val="{}"/>"#, escape(alignment));
            }
            xml.push_str("</w:pPr>");
        }
        let _ = write!(
            xml,
            r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(&paragraph.text)
        );
        xml.push_str("</w:p>");
    }

    xml.push_str("</w:body></w:document>");
    xml
}
