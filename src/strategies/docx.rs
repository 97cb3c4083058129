// Structured DOCX reader: ZIP container + word/document.xml walk
//
// Collects every paragraph run in document order, which pulls in table cell
// text as well since cells are just nested paragraphs. No layout, no
// styles, only the text.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

use crate::document::Document;
use crate::strategies::{Outcome, Strategy, StrategyKind};

pub struct DocxReader;

impl Strategy for DocxReader {
    fn name(&self) -> &'static str {
        "docx-reader"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Structured
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        Outcome::from_result(extract(doc.path()))
    }
}

fn extract(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).context("could not open file")?;
    let mut archive = zip::ZipArchive::new(file).context("not a ZIP container")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("no word/document.xml in archive")?
        .read_to_string(&mut xml)
        .context("document.xml unreadable")?;

    read_document_xml(&xml)
}

/// Walk the WordprocessingML body. Text lives in w:t runs; w:p ends become
/// newlines, explicit tabs and breaks are preserved.
pub(crate) fn read_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .context("malformed document.xml")?
        {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                out.push_str(&t.unescape().context("bad entity in text run")?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Collapse runs of blank lines left by empty paragraphs
    while out.contains("\n\n\n") {
        out = out.replace("\n\n\n", "\n\n");
    }

    Ok(out.trim_end().to_string())
}
