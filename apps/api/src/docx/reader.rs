use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{DocxDocument, DocxError, DocxParagraph, StyleRegistry};

/// Parses a DOCX byte stream into paragraphs and the style registry.
///
/// Any failure here is fatal for the whole pipeline run — there is no
/// partial-document recovery from a corrupt package.
pub fn read_docx(bytes: &[u8]) -> Result<DocxDocument, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, "word/document.xml")?
        .ok_or(DocxError::MissingPart("word/document.xml"))?;
    let styles_xml = read_part(&mut archive, "word/styles.xml")?;

    let paragraphs = parse_paragraphs(&document_xml)?;
    let styles = parse_styles(styles_xml)?;

    Ok(DocxDocument { paragraphs, styles })
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, DocxError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(Some(contents))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_paragraphs(xml: &str) -> Result<Vec<DocxParagraph>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<DocxParagraph> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    current = Some(DocxParagraph {
                        text: String::new(),
                        style_id: None,
                        alignment: None,
                    });
                }
                b"w:pStyle" => apply_style(&mut current, &e),
                b"w:jc" => apply_alignment(&mut current, &e),
                b"w:t" => in_text = current.is_some(),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:pStyle" => apply_style(&mut current, &e),
                b"w:jc" => apply_alignment(&mut current, &e),
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    if let Some(paragraph) = current.as_mut() {
                        paragraph.text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parse_styles(raw_xml: Option<String>) -> Result<StyleRegistry, DocxError> {
    let Some(raw_xml) = raw_xml else {
        return Ok(StyleRegistry::default());
    };

    let mut reader = Reader::from_str(&raw_xml);
    let mut ids = HashSet::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:style" => {
                if let Some(id) = attr_value(&e, b"w:styleId") {
                    ids.insert(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(StyleRegistry::new(ids, Some(raw_xml)))
}

fn apply_style(current: &mut Option<DocxParagraph>, e: &BytesStart) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.style_id = attr_value(e, b"w:val");
    }
}

fn apply_alignment(current: &mut Option<DocxParagraph>, e: &BytesStart) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.alignment = attr_value(e, b"w:val");
    }
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            match unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            }
        })
}
