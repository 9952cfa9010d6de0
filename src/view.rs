//! Projects stored marks onto a visible document as highlight spans.
//!
//! This is the only place marks meet a renderer. Each pass reconciles the file's marks against
//! the document's current length, then turns every interval into a whole-line span running from
//! column zero of its first line to the end of its last line.

use crate::document::Document;
use crate::mark_store::MarkStore;
use crate::reconcile::reconcile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// Line and column inside a document.
pub struct Position {
    /// Zero-based line.
    pub line: usize,
    /// Zero-based character column.
    pub column: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Renderable highlight covering whole lines.
pub struct HighlightSpan {
    /// Column zero of the first marked line.
    pub start: Position,
    /// End of the last marked line.
    pub end: Position,
}

impl HighlightSpan {
    #[must_use]
    /// Whether `line` is inside the span.
    pub fn covers_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

#[derive(Debug, thiserror::Error)]
/// Failure projecting marks for one document.
pub enum ViewError {
    /// A reconciled line could not be resolved in the document.
    #[error("line {line} is outside {key} ({line_count} lines)")]
    LineOutOfRange {
        /// File key being rendered.
        key: String,
        /// Offending line.
        line: usize,
        /// Line count reported by the document.
        line_count: usize,
    },
    /// The render target refused the spans.
    #[error("could not apply highlights to {key}: {reason}")]
    Rejected {
        /// File key being rendered.
        key: String,
        /// Target-specific explanation.
        reason: String,
    },
}

/// Something on screen that shows one document and can display highlights over it.
pub trait HighlightTarget {
    /// Key identifying the displayed file in the mark store.
    fn file_key(&self) -> &str;

    /// The displayed document.
    fn document(&self) -> &dyn Document;

    /// Replaces the target's highlights; an empty list clears them.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot display the spans.
    fn set_highlights(&mut self, spans: Vec<HighlightSpan>) -> Result<(), ViewError>;
}

/// Reconciles and projects the marks for `key` onto `document`.
///
/// A file without an entry yields no spans, which clears any highlights shown for it.
///
/// # Errors
///
/// Returns an error if a reconciled line cannot be found in the document.
pub fn project(
    store: &mut MarkStore,
    key: &str,
    document: &dyn Document,
) -> Result<Vec<HighlightSpan>, ViewError> {
    let Some(set) = store.get_mut(key) else {
        return Ok(Vec::new());
    };
    let line_count = document.line_count();
    let reconciled = reconcile(set, line_count);

    reconciled
        .intervals
        .into_iter()
        .map(|interval| {
            let end_column = document.line_len(interval.end).ok_or_else(|| {
                ViewError::LineOutOfRange {
                    key: key.to_string(),
                    line: interval.end,
                    line_count,
                }
            })?;
            Ok(HighlightSpan {
                start: Position {
                    line: interval.start,
                    column: 0,
                },
                end: Position {
                    line: interval.end,
                    column: end_column,
                },
            })
        })
        .collect()
}

#[derive(Debug, Default)]
/// Summary of one pass over every visible target.
pub struct RenderReport {
    /// Targets whose highlights were updated.
    pub rendered: usize,
    /// Targets that failed, with the reason.
    pub failures: Vec<ViewError>,
}

impl RenderReport {
    #[must_use]
    /// True when every target rendered.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Refreshes highlights on every target; a failing target does not stop the rest.
pub fn render_all<T: HighlightTarget>(store: &mut MarkStore, targets: &mut [T]) -> RenderReport {
    let mut report = RenderReport::default();
    for target in targets.iter_mut() {
        let projected = project(store, target.file_key(), target.document());
        match projected.and_then(|spans| target.set_highlights(spans)) {
            Ok(()) => report.rendered += 1,
            Err(e) => {
                log::warn!("Skipping highlights: {e}");
                report.failures.push(e);
            }
        }
    }
    report
}

#[cfg(test)]
#[path = "tests/view.rs"]
mod tests;
