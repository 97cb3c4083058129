// Strategy registry: one ordered list per document type
//
// Most-reliable-first; every list falls through to the raw byte sieve as
// the universal last resort. The default registry is process-wide,
// initialized once, and never mutated, so concurrent extraction requests
// share it freely.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cascade::CascadeConfig;
use crate::document::DocumentType;
use crate::strategies::{
    CommandPipe, DirectRead, DocxReader, OcrPipeline, PdfTextLayer, RawByteSieve, Strategy,
    StrategyKind,
};

pub static DEFAULT_REGISTRY: Lazy<StrategyRegistry> =
    Lazy::new(|| StrategyRegistry::with_config(&CascadeConfig::default()));

pub struct StrategyRegistry {
    lists: HashMap<DocumentType, Vec<Arc<dyn Strategy>>>,
    sieve: Arc<dyn Strategy>,
}

impl StrategyRegistry {
    pub fn with_config(config: &CascadeConfig) -> Self {
        let timeout = config.command_timeout;
        let mut lists: HashMap<DocumentType, Vec<Arc<dyn Strategy>>> = HashMap::new();

        lists.insert(DocumentType::Docx, vec![Arc::new(DocxReader)]);
        lists.insert(
            DocumentType::Pdf,
            vec![
                Arc::new(PdfTextLayer),
                Arc::new(CommandPipe::pdftotext(timeout)),
                Arc::new(CommandPipe::gs_txtwrite(timeout)),
                Arc::new(OcrPipeline::new(timeout, config.ocr_page_cap)),
            ],
        );
        lists.insert(DocumentType::PlainText, vec![Arc::new(DirectRead)]);
        // Content sniffing is imperfect; unknown binaries get the PDF
        // command pipes speculatively before the sieve.
        lists.insert(
            DocumentType::Unknown,
            vec![
                Arc::new(CommandPipe::pdftotext(timeout)),
                Arc::new(CommandPipe::gs_txtwrite(timeout)),
            ],
        );

        Self {
            lists,
            sieve: Arc::new(RawByteSieve),
        }
    }

    /// Registry with no type-specific lists; attempts go straight to the
    /// sieve. Mainly useful as a base for tests and embedders that install
    /// their own lists.
    pub fn empty() -> Self {
        Self {
            lists: HashMap::new(),
            sieve: Arc::new(RawByteSieve),
        }
    }

    /// Replace the ordered list for one document type.
    pub fn set(&mut self, doc_type: DocumentType, strategies: Vec<Arc<dyn Strategy>>) {
        self.lists.insert(doc_type, strategies);
    }

    /// The ordered strategies for a type, with the universal sieve appended
    /// unless the list already ends in one.
    pub fn strategies_for(&self, doc_type: DocumentType) -> Vec<Arc<dyn Strategy>> {
        let mut list = self.lists.get(&doc_type).cloned().unwrap_or_default();
        let ends_in_sieve = list
            .last()
            .map(|s| s.kind() == StrategyKind::RawSieve)
            .unwrap_or(false);
        if !ends_in_sieve {
            list.push(self.sieve.clone());
        }
        list
    }
}
