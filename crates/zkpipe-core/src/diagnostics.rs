//! # Diagnostic Classification and Formatting
//!
//! The external tools report problems on stdout/stderr as free text, with
//! no machine-readable diagnostic format. This module turns that output
//! into something actionable: a pluggable [`LineClassifier`] decides which
//! lines are errors, and [`DiagnosticFormatter`] groups raw lines into
//! readable blocks.
//!
//! ## Classification
//!
//! The default [`SubstringClassifier`] is a case-insensitive substring
//! heuristic ("error", "warning", bracketed error codes). It is kept
//! behind the trait so a structured format can replace it if the tools
//! ever emit one.
//!
//! ## Grouping Rule
//!
//! A line classified as an error starts a new block; subsequent lines
//! accumulate into that block until the next error line. Lines appearing
//! before any error marker are emitted as standalone entries. Rendered
//! blocks are separated by a blank line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// ANSI CSI escape sequences (colors, cursor movement) emitted by the tools.
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("static regex"));

/// Bracketed diagnostic codes such as `[P1001]` or `error[E042]`.
static BRACKETED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Za-z]+[0-9]+\]").expect("static regex"));

/// Remove ANSI escape sequences from a tool output line.
pub fn strip_ansi(line: &str) -> String {
    ANSI_ESCAPE.replace_all(line, "").into_owned()
}

/// Classification of a single tool output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// The line reports an error.
    Error,
    /// The line reports a warning.
    Warning,
    /// Anything else (progress, stats, banners).
    Info,
}

/// Classifies raw tool output lines.
///
/// Callers strip ANSI escapes before classification. Implementations must
/// be `Send + Sync` so a classifier can be shared across async tasks.
pub trait LineClassifier: Send + Sync {
    /// Classify one output line.
    fn classify(&self, line: &str) -> LineKind;
}

/// Default case-insensitive substring heuristic.
///
/// A line is an error if it contains `error` or a bracketed diagnostic
/// code; a warning if it contains `warning`. Everything else is info.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringClassifier;

impl LineClassifier for SubstringClassifier {
    fn classify(&self, line: &str) -> LineKind {
        let lower = line.to_ascii_lowercase();
        if lower.contains("error") || BRACKETED_CODE.is_match(line) {
            LineKind::Error
        } else if lower.contains("warning") {
            LineKind::Warning
        } else {
            LineKind::Info
        }
    }
}

/// Which stage of the pipeline produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Rejected before the compiler was invoked.
    Precheck,
    /// Classified from circuit compiler output.
    Compiler,
    /// Classified from proving tool output.
    Prover,
    /// Produced during verification.
    Verifier,
}

/// A structured diagnostic: its origin, the raw lines, and the grouped
/// rendering produced by [`DiagnosticFormatter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The pipeline stage that produced the diagnostic.
    pub kind: DiagnosticKind,
    /// Raw output lines, ANSI-stripped, in original order.
    pub lines: Vec<String>,
    /// Grouped block rendering (blocks separated by blank lines).
    pub rendered: String,
}

/// Groups raw tool output lines into readable error blocks.
///
/// Pure transform — no IO, no state beyond the injected classifier.
pub struct DiagnosticFormatter {
    classifier: Box<dyn LineClassifier>,
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::new(Box::new(SubstringClassifier))
    }
}

impl DiagnosticFormatter {
    /// Create a formatter with the given classifier.
    pub fn new(classifier: Box<dyn LineClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify one line with the injected classifier.
    pub fn classify(&self, line: &str) -> LineKind {
        self.classifier.classify(line)
    }

    /// Group lines into blocks.
    ///
    /// Each error-classified line opens a new block; following lines
    /// accumulate into it. Lines with no open block become standalone
    /// entries.
    pub fn group(&self, lines: &[String]) -> Vec<String> {
        let mut blocks: Vec<String> = Vec::new();
        let mut current: Option<String> = None;
        for raw in lines {
            let line = strip_ansi(raw);
            if self.classifier.classify(&line) == LineKind::Error {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
                current = Some(line);
            } else if let Some(block) = current.as_mut() {
                block.push('\n');
                block.push_str(&line);
            } else {
                blocks.push(line);
            }
        }
        if let Some(done) = current {
            blocks.push(done);
        }
        blocks
    }

    /// Render lines as grouped blocks separated by blank lines.
    pub fn render(&self, lines: &[String]) -> String {
        self.group(lines).join("\n\n")
    }

    /// Build a [`Diagnostic`] from raw lines.
    pub fn diagnose(&self, kind: DiagnosticKind, lines: Vec<String>) -> Diagnostic {
        let stripped: Vec<String> = lines.iter().map(|l| strip_ansi(l)).collect();
        let rendered = self.render(&lines);
        Diagnostic {
            kind,
            lines: stripped,
            rendered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(
            strip_ansi("\x1b[31merror[P1001]: foo\x1b[0m"),
            "error[P1001]: foo"
        );
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn classifies_by_substring() {
        let c = SubstringClassifier;
        assert_eq!(c.classify("error[P1001]: foo"), LineKind::Error);
        assert_eq!(c.classify("ERROR: bad things"), LineKind::Error);
        assert_eq!(c.classify("[T2001] undefined signal"), LineKind::Error);
        assert_eq!(c.classify("Warning: unused signal"), LineKind::Warning);
        assert_eq!(c.classify("non-linear constraints: 1"), LineKind::Info);
    }

    #[test]
    fn groups_blocks_per_marker() {
        let formatter = DiagnosticFormatter::default();
        let input = lines(&[
            "info: start",
            "error[P1001]: foo",
            "  detail1",
            "error[P1002]: bar",
            "  detail2",
        ]);
        let blocks = formatter.group(&input);
        assert_eq!(
            blocks,
            vec![
                "info: start".to_string(),
                "error[P1001]: foo\n  detail1".to_string(),
                "error[P1002]: bar\n  detail2".to_string(),
            ]
        );
        assert_eq!(
            formatter.render(&input),
            "info: start\n\nerror[P1001]: foo\n  detail1\n\nerror[P1002]: bar\n  detail2"
        );
    }

    #[test]
    fn leading_lines_stay_standalone() {
        let formatter = DiagnosticFormatter::default();
        let input = lines(&["banner", "another line"]);
        assert_eq!(formatter.group(&input), vec!["banner", "another line"]);
    }

    #[test]
    fn trailing_details_attach_to_last_block() {
        let formatter = DiagnosticFormatter::default();
        let input = lines(&["error: one", "  a", "  b"]);
        assert_eq!(formatter.group(&input), vec!["error: one\n  a\n  b"]);
    }

    #[test]
    fn empty_input_renders_empty() {
        let formatter = DiagnosticFormatter::default();
        assert!(formatter.group(&[]).is_empty());
        assert_eq!(formatter.render(&[]), "");
    }

    #[test]
    fn grouping_strips_ansi_first() {
        let formatter = DiagnosticFormatter::default();
        let input = lines(&["\x1b[1;31merror[P1001]: foo\x1b[0m", "  detail"]);
        assert_eq!(formatter.group(&input), vec!["error[P1001]: foo\n  detail"]);
    }

    #[test]
    fn diagnose_carries_kind_and_rendering() {
        let formatter = DiagnosticFormatter::default();
        let d = formatter.diagnose(
            DiagnosticKind::Compiler,
            lines(&["error: bad", "  context"]),
        );
        assert_eq!(d.kind, DiagnosticKind::Compiler);
        assert_eq!(d.lines.len(), 2);
        assert_eq!(d.rendered, "error: bad\n  context");
    }

    /// A classifier that treats every line as info — grouping then yields
    /// only standalone entries, demonstrating the pluggable seam.
    struct Silent;
    impl LineClassifier for Silent {
        fn classify(&self, _line: &str) -> LineKind {
            LineKind::Info
        }
    }

    #[test]
    fn custom_classifier_changes_grouping() {
        let formatter = DiagnosticFormatter::new(Box::new(Silent));
        let input = lines(&["error: one", "  a"]);
        assert_eq!(formatter.group(&input), vec!["error: one", "  a"]);
    }
}
