//! Reconciliation diagnostics
//!
//! A per-invocation, append-only side channel for conditions that matter to
//! the caller but must not abort the operation: adoptions, drift, tolerated
//! partial failures. Fatal errors are mirrored into the stream so callers
//! always see the complete picture, success or not.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice, e.g. an applied mutation.
    Info,
    /// A condition worth surfacing that did not abort the operation.
    Warning,
    /// A fatal condition; the operation was aborted.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Classification of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An existing remote channel was bound instead of creating a new one.
    Adoption,
    /// Observed remote state diverges from the declared state.
    Drift,
    /// A best-effort membership step before archival failed.
    PartialJoin,
    /// The remote channel is gone or archived out-of-band.
    Vanished,
    /// The acting principal's identity could not be resolved.
    Identity,
    /// A mutation that was applied successfully.
    Applied,
    /// A fatal error, mirrored into the diagnostics stream.
    Failure,
}

/// A single diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// What kind of condition this reports.
    pub kind: DiagnosticKind,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation, when one helps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    /// Create an informational diagnostic.
    pub fn info(kind: DiagnosticKind, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            summary: summary.into(),
            detail: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(kind: DiagnosticKind, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            summary: summary.into(),
            detail: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: DiagnosticKind::Failure,
            summary: summary.into(),
            detail: None,
        }
    }

    /// Attach a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Ordered accumulator of diagnostics for one reconciliation invocation.
///
/// Never shared across invocations; each entry point starts with a fresh
/// accumulator and returns it inside the outcome or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Append all diagnostics from another accumulator, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Iterate over warning-severity entries only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Count the entries of a given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Check whether any fatal entry was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the accumulator is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
