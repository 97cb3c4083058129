use std::path::PathBuf;

/// Errors that cross the extraction boundary. Per-strategy failures and
/// quality rejections stay inside the `CascadeResult` attempt history.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The file could not be read or sniffed at all. Fatal, no retry.
    #[error("could not inspect {path}: {source}")]
    Detection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every strategy for the document's type (plus the raw byte sieve)
    /// failed or produced text below the quality bar.
    #[error("no strategy produced usable text ({attempts} attempted): {}", .reasons.join("; "))]
    Exhausted {
        attempts: usize,
        reasons: Vec<String>,
    },
}
