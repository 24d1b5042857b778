//! Token extraction: turns a PDF (via poppler's `pdftotext -bbox`) or a saved
//! JSON dump into a [`Document`].

use anyhow::{Context, Result, bail};
use mutasi_core::{BoundingBox, Document, Page, Token};
use mutasi_ingest::IngestError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Load a document from a `.json` token dump or a PDF.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        bail!("input not found: {}", path.display());
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        return serde_json::from_str(&s).with_context(|| format!("parse token dump {}", path.display()));
    }

    extract_pdf(path)
}

/// Run `pdftotext -bbox <pdf> -` and parse its word boxes.
pub fn extract_pdf(pdf: &Path) -> Result<Document> {
    let bin = which::which("pdftotext").context(
        "pdftotext is not installed (poppler-utils).\n\nmacOS (brew):  brew install poppler\nUbuntu:        apt install poppler-utils",
    )?;

    let output = Command::new(&bin)
        .arg("-bbox")
        .arg(pdf)
        .arg("-")
        .output()
        .with_context(|| format!("running {}", bin.display()))?;

    if !output.status.success() {
        bail!(
            "pdftotext failed on {} (exit {}): {}",
            pdf.display(),
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let document = parse_bbox_html(&String::from_utf8_lossy(&output.stdout))?;
    debug!(
        pdf = %pdf.display(),
        pages = document.pages.len(),
        tokens = document.token_count(),
        "pdftotext extraction"
    );

    if document.token_count() == 0 {
        return Err(anyhow::Error::new(IngestError::NoTokens).context(format!(
            "{} has no extractable text (scanned, image-only or encrypted?)",
            pdf.display()
        )));
    }
    Ok(document)
}

/// Parse the XHTML emitted by `pdftotext -bbox`.
pub fn parse_bbox_html(html: &str) -> Result<Document> {
    let mut reader = Reader::from_str(html);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut pages: Vec<Page> = Vec::new();
    let mut word: Option<BoundingBox> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .with_context(|| format!("malformed bbox output at byte {}", reader.buffer_position()))?
        {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"page" => {
                    let mut page = Page::new(pages.len(), Vec::new());
                    page.width = attr(&e, b"width").and_then(|v| v.parse().ok());
                    page.height = attr(&e, b"height").and_then(|v| v.parse().ok());
                    pages.push(page);
                }
                b"word" => word = Some(word_box(&e)?),
                _ => {}
            },
            Event::Text(e) => {
                if let Some(bbox) = word.take() {
                    let text = e.unescape().context("bad entity in word text")?;
                    if pages.is_empty() {
                        pages.push(Page::new(0, Vec::new()));
                    }
                    let index = pages.len() - 1;
                    pages[index].tokens.push(Token::new(text.into_owned(), bbox, index));
                }
            }
            Event::End(e) if e.name().as_ref() == b"word" => word = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Document::new(pages))
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn word_box(e: &BytesStart<'_>) -> Result<BoundingBox> {
    let coord = |key: &str| -> Result<f64> {
        let value = attr(e, key.as_bytes()).with_context(|| format!("word without {key}"))?;
        value
            .parse()
            .with_context(|| format!("bad {key} coordinate {value:?}"))
    };
    Ok(BoundingBox::new(
        coord("xMin")?,
        coord("xMax")?,
        coord("yMin")?,
        coord("yMax")?,
    ))
}
