//! Data-quality diagnostics
//!
//! Nothing found in the sheet data aborts a run. Every skipped or defaulted
//! item is recorded here and logged.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnresolvedTable,
    UnresolvedField,
    UnknownType,
    UnknownEnum,
    DuplicateEnum,
    InvalidEnumName,
    DuplicateField,
    DuplicateTable,
    OrphanEnumValue,
    UnrecognizedRelation,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnresolvedTable
            | DiagnosticKind::UnknownEnum
            | DiagnosticKind::DuplicateEnum
            | DiagnosticKind::InvalidEnumName
            | DiagnosticKind::DuplicateField
            | DiagnosticKind::DuplicateTable => Severity::Warning,
            DiagnosticKind::UnresolvedField
            | DiagnosticKind::UnknownType
            | DiagnosticKind::OrphanEnumValue
            | DiagnosticKind::UnrecognizedRelation => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// Ordered list of diagnostics collected during a run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record a diagnostic and emit it as a tracing event
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        let severity = kind.severity();

        match severity {
            Severity::Warning => tracing::warn!(kind = ?kind, "{}", message),
            Severity::Info => tracing::debug!(kind = ?kind, "{}", message),
        }

        self.items.push(Diagnostic {
            severity,
            kind,
            message,
        });
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }
}
