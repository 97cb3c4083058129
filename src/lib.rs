// docsieve - text extraction cascade for uploaded documents
//
// Given an arbitrary document (PDF, DOCX, plain text, or unknown binary),
// try progressively cruder extraction strategies until one yields text the
// quality gate accepts, and report which strategy won. Callers get either
// accepted text with provenance or the full per-strategy failure history.

pub mod cascade;
pub mod detect;
pub mod document;
pub mod error;
pub mod quality;
pub mod registry;
pub mod strategies;

pub use cascade::{extract, extract_with, Attempt, CascadeConfig, CascadeResult, Disposition, Extraction};
pub use document::{Document, DocumentType};
pub use error::ExtractError;
pub use registry::StrategyRegistry;
pub use strategies::{Outcome, Strategy, StrategyKind};
