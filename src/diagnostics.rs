//! Diagnostics taxonomy and collector.
//!
//! The merge engines and the consistency checker record findings here instead
//! of logging directly, so their logic is testable without capturing console
//! output. The CLI forwards collected entries to the `log` crate between
//! pipeline stages.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Bookkeeping notices, e.g. a record dropped while writing the repaired
    /// topology.
    Info,
    /// Recoverable input problems; the offending record is skipped or merged.
    Warning,
    /// Topology-level violations that force repair filtering.
    Error,
}

/// Classification of everything the pipeline can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A line that does not match its file grammar.
    MalformedLine,
    /// A link or session whose two endpoints are the same router.
    SelfLoop,
    /// An iBGP session token outside `UP`/`OVER`/`DOWN`.
    InvalidLabel,
    /// Two observations of the same direction disagree on the value.
    ConflictingObservation,
    /// An IGP link observed in only one direction.
    AsymmetricLink,
    /// An iBGP session observed in only one direction.
    AsymmetricSession,
    /// Both ends of a session claim to be a reflection client of the other.
    StructuralAnomaly,
    /// Router-set mismatch between the IGP, iBGP and ASBR tables.
    ConsistencyViolation,
}

/// A single finding produced while merging or checking a topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Ordered collector of diagnostics.
///
/// Entries are appended in discovery order and never dropped. A flush cursor
/// lets the CLI surface new entries stage by stage while library callers
/// still see the full list at the end.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    flushed: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            severity,
            kind,
            message: message.into(),
        });
    }

    /// Record an informational notice.
    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Severity::Info, kind, message);
    }

    /// Record a warning.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Severity::Warning, kind, message);
    }

    /// Record an error.
    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Severity::Error, kind, message);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Append every entry of `other`, preserving their order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Forward entries recorded since the previous flush to the `log` crate.
    pub fn flush_to_log(&mut self) {
        for entry in &self.entries[self.flushed..] {
            match entry.severity {
                Severity::Info => log::info!("{}", entry.message),
                Severity::Warning => log::warn!("{}", entry.message),
                Severity::Error => log::error!("{}", entry.message),
            }
        }
        self.flushed = self.entries.len();
    }
}
