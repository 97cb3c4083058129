// PDF text layer extraction with lopdf
//
// Most reliable PDF path: read the embedded text layer directly. Encrypted,
// corrupt, or scanned-image PDFs fail here and fall through to the external
// command pipes and OCR.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::document::Document;
use crate::strategies::{Outcome, Strategy, StrategyKind};

pub struct PdfTextLayer;

impl Strategy for PdfTextLayer {
    fn name(&self) -> &'static str {
        "pdf-text-layer"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Library
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        Outcome::from_result(extract(doc.path()))
    }
}

fn extract(path: &Path) -> Result<String> {
    let document = lopdf::Document::load(path).context("could not load PDF")?;
    if document.is_encrypted() {
        bail!("PDF is encrypted");
    }

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        bail!("PDF has no pages");
    }

    let text = document
        .extract_text(&page_numbers)
        .context("text layer unreadable")?;
    Ok(text)
}
