// Extraction cascade: walk the ordered strategy list until one wins
//
// The single place that owns fallback logic. Every entry point delegates
// here rather than re-deriving strategy order. Strategies are tried
// strictly in sequence (each one may spawn expensive external processes);
// the registry order IS the preference order, so the first accepted result
// wins and nothing below it ever runs.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::ExtractError;
use crate::quality;
use crate::registry::{StrategyRegistry, DEFAULT_REGISTRY};
use crate::strategies::{Outcome, StrategyKind};

/// Knobs for the cascade. Immutable after construction; build a registry
/// from it once and share by reference.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Deadline for each external command before it is killed.
    pub command_timeout: Duration,
    /// Pages the OCR strategy will rasterize at most.
    pub ocr_page_cap: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(20),
            ocr_page_cap: 10,
        }
    }
}

/// Accepted text plus its provenance.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub strategy: &'static str,
}

/// How one strategy invocation ended.
#[derive(Debug, Clone)]
pub enum Disposition {
    Accepted,
    /// The strategy could not produce text at all.
    Failed(String),
    /// The strategy produced text but the quality gate refused it. The text
    /// is retained so callers can still surface a degraded best effort.
    Rejected { reason: String, text: String },
}

/// One entry in the attempt history, in invocation order.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub strategy: &'static str,
    pub kind: StrategyKind,
    pub disposition: Disposition,
}

/// Everything that happened while extracting one document: the winner, if
/// any, and the ordered record of every attempt.
#[derive(Debug, Clone)]
pub struct CascadeResult {
    pub winner: Option<Extraction>,
    pub attempts: Vec<Attempt>,
}

impl CascadeResult {
    pub fn is_success(&self) -> bool {
        self.winner.is_some()
    }

    /// Failure and rejection reasons in attempt order, one per non-accepted
    /// strategy.
    pub fn failure_reasons(&self) -> Vec<String> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.disposition {
                Disposition::Accepted => None,
                Disposition::Failed(reason) => Some(format!("{}: {}", a.strategy, reason)),
                Disposition::Rejected { reason, .. } => Some(format!("{}: {}", a.strategy, reason)),
            })
            .collect()
    }

    /// Quality-rejected texts with their producing strategy, in order.
    pub fn rejected_candidates(&self) -> Vec<(&'static str, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.disposition {
                Disposition::Rejected { text, .. } => Some((a.strategy, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Degraded-success policy hook: the winner when there is one, else the
    /// longest quality-rejected text. Callers decide whether sub-threshold
    /// text is better than nothing.
    pub fn best_effort(&self) -> Option<(&'static str, &str)> {
        if let Some(winner) = &self.winner {
            return Some((winner.strategy, winner.text.as_str()));
        }
        self.rejected_candidates()
            .into_iter()
            .max_by_key(|(_, text)| text.trim().len())
    }

    /// Hard-failure view: the accepted extraction, or `Exhausted` carrying
    /// the full attempt history.
    pub fn into_accepted(self) -> Result<Extraction, ExtractError> {
        let reasons = self.failure_reasons();
        match self.winner {
            Some(extraction) => Ok(extraction),
            None => Err(ExtractError::Exhausted {
                attempts: self.attempts.len(),
                reasons,
            }),
        }
    }
}

/// Run the cascade with the process-wide default registry.
pub fn extract(doc: &Document) -> CascadeResult {
    extract_with(&DEFAULT_REGISTRY, doc)
}

/// Run the cascade with an explicit registry. Strategies are invoked in
/// order; a strategy's internal error never aborts the walk.
pub fn extract_with(registry: &StrategyRegistry, doc: &Document) -> CascadeResult {
    let strategies = registry.strategies_for(doc.doc_type());
    let mut attempts = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        debug!(
            strategy = strategy.name(),
            doc_type = %doc.doc_type(),
            "attempting extraction"
        );

        match strategy.attempt(doc) {
            Outcome::Failed(reason) => {
                warn!(strategy = strategy.name(), %reason, "strategy failed");
                attempts.push(Attempt {
                    strategy: strategy.name(),
                    kind: strategy.kind(),
                    disposition: Disposition::Failed(reason),
                });
            }
            Outcome::Text(text) => match quality::accept(&text, strategy.kind()) {
                Ok(()) => {
                    info!(
                        strategy = strategy.name(),
                        chars = text.len(),
                        "extraction accepted"
                    );
                    attempts.push(Attempt {
                        strategy: strategy.name(),
                        kind: strategy.kind(),
                        disposition: Disposition::Accepted,
                    });
                    return CascadeResult {
                        winner: Some(Extraction {
                            text,
                            strategy: strategy.name(),
                        }),
                        attempts,
                    };
                }
                Err(reason) => {
                    debug!(strategy = strategy.name(), %reason, "quality rejected");
                    attempts.push(Attempt {
                        strategy: strategy.name(),
                        kind: strategy.kind(),
                        disposition: Disposition::Rejected { reason, text },
                    });
                }
            },
        }
    }

    CascadeResult {
        winner: None,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentType;
    use crate::strategies::Strategy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Stub strategies so cascade behavior is tested without touching disk
    // or external tools.

    struct Yields(&'static str, &'static str);
    impl Strategy for Yields {
        fn name(&self) -> &'static str {
            self.0
        }
        fn kind(&self) -> StrategyKind {
            StrategyKind::Library
        }
        fn attempt(&self, _doc: &Document) -> Outcome {
            Outcome::Text(self.1.to_string())
        }
    }

    struct Fails(&'static str);
    impl Strategy for Fails {
        fn name(&self) -> &'static str {
            self.0
        }
        fn kind(&self) -> StrategyKind {
            StrategyKind::CommandPipe
        }
        fn attempt(&self, _doc: &Document) -> Outcome {
            Outcome::Failed("tool not found".to_string())
        }
    }

    // Terminal stub whose kind is RawSieve so `strategies_for` does not
    // append the real sieve behind it (see registry::sieve_is_not_double_appended).
    struct FailsAsSieve(&'static str);
    impl Strategy for FailsAsSieve {
        fn name(&self) -> &'static str {
            self.0
        }
        fn kind(&self) -> StrategyKind {
            StrategyKind::RawSieve
        }
        fn attempt(&self, _doc: &Document) -> Outcome {
            Outcome::Failed("tool not found".to_string())
        }
    }

    struct Counts(Arc<AtomicUsize>);
    impl Strategy for Counts {
        fn name(&self) -> &'static str {
            "counter"
        }
        fn kind(&self) -> StrategyKind {
            StrategyKind::Library
        }
        fn attempt(&self, _doc: &Document) -> Outcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            Outcome::Text("z".repeat(100))
        }
    }

    // The TempDir guard rides along so the fixture outlives the test body.
    fn doc() -> (tempfile::TempDir, Document) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.bin");
        std::fs::write(&path, b"irrelevant").unwrap();
        let document = Document::with_type(path, DocumentType::Unknown).unwrap();
        (dir, document)
    }

    fn registry(list: Vec<Arc<dyn Strategy>>) -> StrategyRegistry {
        let mut registry = StrategyRegistry::empty();
        registry.set(DocumentType::Unknown, list);
        registry
    }

    #[test]
    fn first_accepted_wins_and_nothing_below_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = registry(vec![
            Arc::new(Yields("good", "accepted text, well over the fifty char minimum for library output")),
            Arc::new(Counts(counter.clone())),
        ]);
        let (_dir, document) = doc();
        let result = extract_with(&registry, &document);

        assert_eq!(result.winner.as_ref().unwrap().strategy, "good");
        assert_eq!(counter.load(Ordering::SeqCst), 0, "lower strategy must not run");
        assert_eq!(result.attempts.len(), 1);
    }

    #[test]
    fn failures_fall_through_to_later_strategies() {
        let registry = registry(vec![
            Arc::new(Fails("first")),
            Arc::new(Fails("second")),
            Arc::new(Yields("third", "finally some text long enough to clear the quality threshold here")),
        ]);
        let (_dir, document) = doc();
        let result = extract_with(&registry, &document);

        assert_eq!(result.winner.as_ref().unwrap().strategy, "third");
        assert_eq!(result.attempts.len(), 3);
        assert_eq!(result.failure_reasons().len(), 2);
    }

    #[test]
    fn rejected_text_is_retained_for_diagnostics() {
        let registry = registry(vec![
            Arc::new(Yields("short", "tiny")),
            Arc::new(FailsAsSieve("broken")),
        ]);
        let (_dir, document) = doc();
        let result = extract_with(&registry, &document);

        assert!(!result.is_success());
        assert_eq!(result.attempts.len(), 2);
        let rejected = result.rejected_candidates();
        assert_eq!(rejected, vec![("short", "tiny")]);
        assert_eq!(result.best_effort(), Some(("short", "tiny")));
    }

    #[test]
    fn cid_corrupted_text_layer_falls_through_to_next_strategy() {
        struct CorruptLayer;
        impl Strategy for CorruptLayer {
            fn name(&self) -> &'static str {
                "corrupt-layer"
            }
            fn kind(&self) -> StrategyKind {
                StrategyKind::Library
            }
            fn attempt(&self, _doc: &Document) -> Outcome {
                Outcome::Text("(cid:71)(cid:72)(cid:73) ".repeat(30))
            }
        }

        let registry = registry(vec![
            Arc::new(CorruptLayer),
            Arc::new(Yields("clean-pipe", "clean text from the external pipe, comfortably past fifty characters")),
        ]);
        let (_dir, document) = doc();
        let result = extract_with(&registry, &document);

        assert_eq!(result.winner.as_ref().unwrap().strategy, "clean-pipe");
        assert_eq!(result.rejected_candidates().len(), 1);
        assert!(result.failure_reasons()[0].contains("CID"));
    }

    #[test]
    fn exhausted_reason_count_matches_attempts() {
        let registry = registry(vec![Arc::new(Fails("a")), Arc::new(FailsAsSieve("b"))]);
        let (_dir, document) = doc();
        let result = extract_with(&registry, &document);

        assert_eq!(result.failure_reasons().len(), result.attempts.len());
        match result.into_accepted() {
            Err(ExtractError::Exhausted { attempts, reasons }) => {
                assert_eq!(attempts, 2);
                assert_eq!(reasons.len(), 2);
            }
            other => panic!("expected Exhausted, got {:?}", other.map(|e| e.strategy)),
        }
    }

    #[test]
    fn cascade_is_idempotent() {
        let registry = registry(vec![
            Arc::new(Fails("flaky-looking")),
            Arc::new(Yields("stable", "the same winning text comes back on every invocation of the cascade")),
        ]);
        let (_dir, document) = doc();
        let first = extract_with(&registry, &document);
        let second = extract_with(&registry, &document);

        let a = first.winner.unwrap();
        let b = second.winner.unwrap();
        assert_eq!(a.strategy, b.strategy);
        assert_eq!(a.text, b.text);
    }
}
