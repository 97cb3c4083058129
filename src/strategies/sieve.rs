// Raw byte sieve: last-resort catch-all for every document type
//
// Filters the byte stream down to runs of printable ASCII plus whitespace,
// the way strings(1) does. The quality gate holds this strategy to the
// highest bar since almost any binary yields some printable runs.

use crate::document::Document;
use crate::strategies::{Outcome, Strategy, StrategyKind};

/// Minimum printable run length worth keeping; shorter runs are almost
/// always binary noise.
const MIN_RUN: usize = 4;

pub struct RawByteSieve;

impl Strategy for RawByteSieve {
    fn name(&self) -> &'static str {
        "raw-byte-sieve"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RawSieve
    }

    fn attempt(&self, doc: &Document) -> Outcome {
        let bytes = match doc.read_bytes() {
            Ok(bytes) => bytes,
            Err(e) => return Outcome::Failed(format!("could not read file: {}", e)),
        };

        let text = sift(&bytes);
        if text.trim().is_empty() {
            Outcome::Failed("no printable content".to_string())
        } else {
            Outcome::Text(text)
        }
    }
}

fn sift(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut run = String::new();

    for &b in bytes {
        if is_printable(b) {
            run.push(b as char);
        } else {
            flush(&mut out, &mut run);
        }
    }
    flush(&mut out, &mut run);

    out
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7e).contains(&b) || b == b'\n' || b == b'\r' || b == b'\t'
}

fn flush(out: &mut String, run: &mut String) {
    if run.trim().len() >= MIN_RUN {
        out.push_str(run);
        out.push('\n');
    }
    run.clear();
}
