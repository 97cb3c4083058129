// Extraction strategies
//
// One module per technique. Every strategy is stateless, repeatable, and
// converts its internal errors into Outcome::Failed at the boundary so the
// cascade can keep walking the list.

pub mod command;
pub mod docx;
pub mod ocr;
pub mod pdf_text;
pub mod plain;
pub mod sieve;

pub use command::CommandPipe;
pub use docx::DocxReader;
pub use ocr::OcrPipeline;
pub use pdf_text::PdfTextLayer;
pub use plain::DirectRead;
pub use sieve::RawByteSieve;

use crate::document::Document;

/// Reliability class of a strategy. The quality gate tunes its thresholds
/// per kind because cruder methods produce plausible-looking garbage more
/// often.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Walks real document structure (DOCX paragraphs and tables)
    Structured,
    /// Dedicated format library reading the text layer
    Library,
    /// Pipes the file through an external extraction command
    CommandPipe,
    /// Rasterizes pages and reads glyphs back
    Ocr,
    /// Decodes the file directly as text
    DirectRead,
    /// Filters raw bytes down to printable runs; last resort
    RawSieve,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Structured => "structured",
            StrategyKind::Library => "library",
            StrategyKind::CommandPipe => "command-pipe",
            StrategyKind::Ocr => "ocr",
            StrategyKind::DirectRead => "direct-read",
            StrategyKind::RawSieve => "raw-sieve",
        }
    }
}

/// What one strategy invocation produced. Never both.
#[derive(Debug, Clone)]
pub enum Outcome {
    Text(String),
    Failed(String),
}

impl Outcome {
    pub(crate) fn from_result(result: anyhow::Result<String>) -> Self {
        match result {
            Ok(text) => Outcome::Text(text),
            Err(e) => Outcome::Failed(format!("{:#}", e)),
        }
    }
}

/// A single extraction technique. Implementations spawn external tools or
/// parse the file themselves but never abort the cascade: any error becomes
/// `Outcome::Failed(reason)`.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> StrategyKind;
    fn attempt(&self, doc: &Document) -> Outcome;
}
