// Quality gate applied to every strategy's output before it is trusted
//
// Two rules, tuned per strategy kind:
//   - a minimum trimmed length (cruder methods need a higher bar, since a
//     few hundred printable bytes fall out of almost any binary)
//   - no CID markers, the telltale of a PDF's internal character references
//     leaking into output instead of rendered glyphs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::strategies::StrategyKind;

static CID_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(cid:\d+\)").unwrap());

/// Minimum trimmed character count for a kind's output to be trusted.
pub fn min_chars(kind: StrategyKind) -> usize {
    match kind {
        StrategyKind::DirectRead => 1,
        StrategyKind::Structured => 20,
        StrategyKind::Library | StrategyKind::CommandPipe | StrategyKind::Ocr => 50,
        StrategyKind::RawSieve => 200,
    }
}

/// Accept or reject extracted text. Pure function; the reason string goes
/// straight into the attempt history.
pub fn accept(text: &str, kind: StrategyKind) -> Result<(), String> {
    let trimmed_len = text.trim().chars().count();
    let required = min_chars(kind);
    if trimmed_len < required {
        return Err(format!(
            "only {} chars of text, {} extraction needs {}",
            trimmed_len,
            kind.label(),
            required
        ));
    }

    if CID_MARKER.is_match(text) {
        return Err("output contains CID markers (undecoded glyph references)".to_string());
    }

    Ok(())
}
