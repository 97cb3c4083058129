// OCR pipeline: rasterize pages with ghostscript, read glyphs with tesseract
//
// Slowest and least reliable PDF path, tried only after the text layer and
// both command pipes. Both external tools are opaque collaborators; either
// one missing turns the whole strategy into a Failed outcome.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use crate::document::Document;
use crate::strategies::command::run_with_timeout;
use crate::strategies::{Outcome, Strategy, StrategyKind};

pub struct OcrPipeline {
    timeout: Duration,
    /// Rasterization stops after this many pages; OCR on a long document
    /// costs seconds per page and the quality gate only needs enough text.
    page_cap: u32,
}

impl OcrPipeline {
    pub fn new(timeout: Duration, page_cap: u32) -> Self {
        Self { timeout, page_cap }
    }
}

impl Strategy for OcrPipeline {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ocr
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        Outcome::from_result(self.extract(doc.path()))
    }
}

impl OcrPipeline {
    fn extract(&self, path: &Path) -> Result<String> {
        let workdir = tempfile::tempdir().context("could not create scratch dir")?;
        let pages = self.rasterize(path, workdir.path())?;
        debug!(pages = pages.len(), "rasterized pages for OCR");

        let mut text = String::new();
        for page in &pages {
            let page_text = self.recognize(page)?;
            text.push_str(&page_text);
            text.push_str("\n\n");
        }
        Ok(text)
    }

    fn rasterize(&self, path: &Path, workdir: &Path) -> Result<Vec<PathBuf>> {
        let pattern = workdir.join("page-%03d.png");
        let mut gs = Command::new("gs");
        gs.args(["-dNOPAUSE", "-dBATCH", "-dQUIET", "-r200", "-sDEVICE=png16m"])
            .arg(format!("-dLastPage={}", self.page_cap))
            .arg(format!("-sOutputFile={}", pattern.display()))
            .arg(path);

        match run_with_timeout(&mut gs, self.timeout) {
            Err(reason) => bail!(reason),
            Ok(None) => bail!("timeout rasterizing pages"),
            Ok(Some(captured)) if !captured.status.success() => {
                bail!("rasterizer exited with {}", captured.status)
            }
            Ok(Some(_)) => {}
        }

        let mut pages: Vec<PathBuf> = std::fs::read_dir(workdir)
            .context("scratch dir unreadable")?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "png").unwrap_or(false))
            .collect();
        pages.sort();

        if pages.is_empty() {
            bail!("rasterizer produced no pages");
        }
        Ok(pages)
    }

    fn recognize(&self, page: &Path) -> Result<String> {
        let mut tess = Command::new("tesseract");
        tess.arg(page).arg("stdout");

        match run_with_timeout(&mut tess, self.timeout) {
            Err(reason) => Err(anyhow!(reason)),
            Ok(None) => bail!("timeout reading page {}", page.display()),
            Ok(Some(captured)) if !captured.status.success() => {
                bail!("tesseract exited with {}", captured.status)
            }
            Ok(Some(captured)) => Ok(String::from_utf8_lossy(&captured.stdout).into_owned()),
        }
    }
}
