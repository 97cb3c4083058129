// Content-first type sniffing with extension fallback
//
// Deterministic for identical bytes: magic numbers first, then a known
// extension, then a UTF-8 scan of the leading sample. ZIP containers are
// probed for word/document.xml so DOCX is told apart from other archives.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::document::DocumentType;
use crate::error::ExtractError;

const SNIFF_LEN: usize = 8192;

pub fn detect(path: &Path) -> Result<(DocumentType, String), ExtractError> {
    let sample = read_sample(path)?;

    if sample.starts_with(b"%PDF-") {
        return Ok((DocumentType::Pdf, "application/pdf".into()));
    }

    if sample.starts_with(b"PK\x03\x04") {
        return Ok(classify_zip(path));
    }

    if let Some(found) = classify_extension(path) {
        return Ok(found);
    }

    if looks_like_text(&sample) {
        return Ok((DocumentType::PlainText, "text/plain".into()));
    }

    Ok((DocumentType::Unknown, "application/octet-stream".into()))
}

fn read_sample(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let mut file = File::open(path).map_err(|source| ExtractError::Detection {
        path: path.to_path_buf(),
        source,
    })?;
    let mut sample = vec![0u8; SNIFF_LEN];
    let n = file.read(&mut sample).map_err(|source| ExtractError::Detection {
        path: path.to_path_buf(),
        source,
    })?;
    sample.truncate(n);
    Ok(sample)
}

// A ZIP that carries word/document.xml is a DOCX; any other archive goes
// through the Unknown cascade.
fn classify_zip(path: &Path) -> (DocumentType, String) {
    let is_docx = File::open(path)
        .ok()
        .and_then(|f| zip::ZipArchive::new(f).ok())
        .map(|mut archive| archive.by_name("word/document.xml").is_ok())
        .unwrap_or(false);

    if is_docx {
        (
            DocumentType::Docx,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
        )
    } else {
        (DocumentType::Unknown, "application/zip".into())
    }
}

fn classify_extension(path: &Path) -> Option<(DocumentType, String)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some((DocumentType::Pdf, "application/pdf".into())),
        "docx" => Some((
            DocumentType::Docx,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
        )),
        "txt" | "md" | "markdown" | "csv" | "log" => {
            Some((DocumentType::PlainText, "text/plain".into()))
        }
        _ => None,
    }
}

// NUL bytes rule out text outright; otherwise the sample must decode as
// UTF-8, allowing a multi-byte sequence cut off at the sample boundary.
fn looks_like_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && sample.len() - e.valid_up_to() < 4,
    }
}
