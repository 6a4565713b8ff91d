//! Non-fatal diagnostics emitted by parsers and generators.
//!
//! Warnings record lossy or best-effort translation decisions; they never
//! abort a conversion on their own. Each parse or generate call receives its
//! own [`WarningCollector`] sink, so concurrent conversions share nothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::Pos;

// ============================================================================
// SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// WARNING RECORD
// ============================================================================

/// A single severity-tagged diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl Warning {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            line: None,
            suggestion: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at(self, pos: Option<Pos>) -> Self {
        match pos {
            Some(pos) => self.at_line(pos.line),
            None => self,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity.as_str().to_uppercase())?;
        if let Some(line) = self.line {
            write!(f, " Line {line}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

/// Append-only warning sink owned by a single parse or generate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningCollector {
    warnings: Vec<Warning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Shorthand for the common warning-severity case.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.add(Warning::new(Severity::Warning, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Warning::new(Severity::Info, message));
    }

    pub fn all(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Warning> {
        self.of_severity(Severity::Error)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Warning> {
        self.of_severity(Severity::Info)
    }

    fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.severity == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let infos = self.infos().count();
        let warnings = self.len() - errors - infos;
        format!("Conversion complete: {errors} errors, {warnings} warnings, {infos} info messages")
    }
}

impl fmt::Display for WarningCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, warning) in self.warnings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{warning}")?;
        }
        Ok(())
    }
}
