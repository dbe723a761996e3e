use serde::Serialize;

use crate::ast::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub level: DiagnosticLevel,
    pub line: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.push_error_at(message, None);
    }

    pub fn push_error_at<S: Into<String>>(&mut self, message: S, line: Option<usize>) {
        self.entries.push(Diagnostic {
            message: message.into(),
            level: DiagnosticLevel::Error,
            line,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Re-level every entry as a warning.
    pub fn into_warnings(mut self) -> Diagnostics {
        for entry in &mut self.entries {
            entry.level = DiagnosticLevel::Warning;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|diagnostic| diagnostic.level == DiagnosticLevel::Error)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }
}

impl From<&[ParseError]> for Diagnostics {
    fn from(errors: &[ParseError]) -> Self {
        let mut diagnostics = Diagnostics::new();
        for error in errors {
            diagnostics.push_error_at(error.message.clone(), Some(error.line));
        }
        diagnostics
    }
}
