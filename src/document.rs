// Document handle and type classification

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::detect;
use crate::error::ExtractError;

/// Closed set of document classes. Each class maps to one ordered strategy
/// list in the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Pdf,
    Docx,
    PlainText,
    Unknown,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::PlainText => "text",
            DocumentType::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentType::Pdf),
            "docx" | "word" => Ok(DocumentType::Docx),
            "text" | "txt" | "plain" => Ok(DocumentType::PlainText),
            "unknown" | "binary" => Ok(DocumentType::Unknown),
            other => Err(format!("unknown document kind '{}'", other)),
        }
    }
}

/// Immutable reference to one uploaded file plus its detected type. Created
/// once per extraction request and never mutated; strategies read the file
/// themselves and keep no state between invocations.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    doc_type: DocumentType,
    mime_hint: String,
}

impl Document {
    /// Open a file and sniff its type. An unreadable file is fatal to the
    /// whole extraction call.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let path = path.into();
        let (doc_type, mime_hint) = detect::detect(&path)?;
        Ok(Self {
            path,
            doc_type,
            mime_hint,
        })
    }

    /// Open a file with a caller-declared type, skipping content sniffing.
    /// Still verifies the file is readable.
    pub fn with_type(path: impl Into<PathBuf>, doc_type: DocumentType) -> Result<Self, ExtractError> {
        let path = path.into();
        File::open(&path).map_err(|source| ExtractError::Detection {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            doc_type,
            mime_hint: format!("declared/{}", doc_type),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    /// Raw MIME-like string from detection (or `declared/...` when the
    /// caller supplied the type).
    pub fn mime_hint(&self) -> &str {
        &self.mime_hint
    }

    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}
