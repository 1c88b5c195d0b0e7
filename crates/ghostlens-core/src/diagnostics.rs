//! Per-record data-quality findings collected during a run.
//!
//! Recoverable problems are never just logged and dropped: every one is
//! pushed here so callers can audit the input they supplied.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A record was rejected; it did not take part in the run.
    Validation,
    /// An optional input was missing and a documented default was used.
    IncompleteData,
    /// An event repeated one already recorded and was ignored.
    DuplicateEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Username, file name, or record locator the finding is about.
    pub subject: String,
    pub message: String,
}

/// Ordered diagnostics list. Order follows the order findings were made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validation(&mut self, subject: impl Into<String>, err: &ValidationError) {
        let subject = subject.into();
        tracing::warn!(subject = %subject, error = %err, "record rejected");
        self.0.push(Diagnostic {
            kind: DiagnosticKind::Validation,
            subject,
            message: err.to_string(),
        });
    }

    pub fn incomplete(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let subject = subject.into();
        let message = message.into();
        tracing::debug!(subject = %subject, message = %message, "incomplete data");
        self.0.push(Diagnostic {
            kind: DiagnosticKind::IncompleteData,
            subject,
            message,
        });
    }

    pub fn duplicate(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let subject = subject.into();
        let message = message.into();
        tracing::debug!(subject = %subject, message = %message, "duplicate event ignored");
        self.0.push(Diagnostic {
            kind: DiagnosticKind::DuplicateEvent,
            subject,
            message,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Number of findings of one kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
