// Direct read for plain text uploads

use tracing::debug;

use crate::document::Document;
use crate::strategies::{Outcome, Strategy, StrategyKind};

/// Decode the file as UTF-8; on invalid sequences, re-decode permissively
/// with replacement characters rather than failing the upload.
pub struct DirectRead;

impl Strategy for DirectRead {
    fn name(&self) -> &'static str {
        "direct-read"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectRead
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        let bytes = match doc.read_bytes() {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::Failed(format!("could not read file: {}", e)),
        };

        match String::from_utf8(bytes) {
            Ok(text) => Outcome::Text(text),
            Err(e) => {
                debug!("invalid UTF-8 in text upload, decoding permissively");
                Outcome::Text(String::from_utf8_lossy(&e.into_bytes()).into_owned())
            }
        }
    }
}
