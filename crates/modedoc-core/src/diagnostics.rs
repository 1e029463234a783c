//! Transform diagnostics for modedoc
//!
//! Problems found while expanding short-codes or checking the mode
//! registry never abort a run. They are recorded as [`Diagnostic`]s and
//! pushed to a host-owned [`DiagnosticSink`].

use serde::{Deserialize, Serialize};

use modedoc_ast::Position;

/// A diagnostic message produced during a transform run
///
/// # Example
///
/// ```
/// use modedoc_core::diagnostics::{Diagnostic, DiagnosticKind, Span};
///
/// let diag = Diagnostic::from_kind(
///     DiagnosticKind::UnknownShortcode,
///     r#"shortcode: "var", unknown replacement "colour""#,
/// )
/// .with_span(Span::new(10, 25).with_position(3, 7))
/// .with_help("Add the name to every mode dictionary");
/// assert_eq!(diag.code.as_deref(), Some("MD001"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Structured classification, when the diagnostic comes from modedoc itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiagnosticKind>,

    /// Stable code (e.g., "MD001")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Source location the issue is attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    /// Optional file path where the issue occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Related notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning, indicates a potential authoring problem
    Warning,

    /// Error, a node could not be expanded and was dropped
    Error,
}

/// Classification of the problems modedoc reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A `var` short-code named something no dictionary of the active mode defines
    UnknownShortcode,
    /// A short-code was invoked without its required argument
    MissingRequiredArgument,
    /// A generic language block named no language and emitted nothing
    MissingLanguageTag,
    /// A name is defined for some modes but missing for others
    RegistryMismatch,
}

impl DiagnosticKind {
    /// Stable diagnostic code
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownShortcode => "MD001",
            DiagnosticKind::MissingRequiredArgument => "MD002",
            DiagnosticKind::RegistryMismatch => "MD003",
            DiagnosticKind::MissingLanguageTag => "MD004",
        }
    }

    /// Default severity for this kind
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnknownShortcode | DiagnosticKind::MissingRequiredArgument => {
                Severity::Error
            }
            DiagnosticKind::RegistryMismatch | DiagnosticKind::MissingLanguageTag => {
                Severity::Warning
            }
        }
    }
}

/// A source location span
///
/// Offsets are bytes; line and column are 1-indexed when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,

    /// Optional line number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Optional column number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            kind: None,
            code: None,
            span: None,
            file: None,
            help: None,
            notes: Vec::new(),
        }
    }

    /// Create a diagnostic of a known kind, with its code and default severity
    pub fn from_kind(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        let mut diag = Self::new(kind.severity(), message).with_code(kind.code());
        diag.kind = Some(kind);
        diag
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Set the source span from a node position, if there is one
    pub fn at(mut self, position: Option<&Position>) -> Self {
        self.span = position.map(Span::from);
        self
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl Span {
    /// Create a new span from start and end offsets
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: None,
            column: None,
        }
    }

    /// Set both line and column
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<&Position> for Span {
    fn from(position: &Position) -> Self {
        let start = position.start.offset.unwrap_or(0);
        let end = position.end.offset.unwrap_or(start);
        Span::new(start, end).with_position(position.start.line, position.start.column)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        let location = self
            .span
            .and_then(|span| Some((span.line?, span.column?)));
        match (&self.file, location) {
            (Some(file), Some((line, col))) => write!(f, "\n  --> {}:{}:{}", file, line, col)?,
            (Some(file), None) => write!(f, "\n  --> {}", file)?,
            (None, Some((line, col))) => write!(f, "\n  --> {}:{}", line, col)?,
            (None, None) => {}
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}

/// Destination for diagnostics raised during a run
///
/// The host owns the sink; modedoc only ever pushes into it.
pub trait DiagnosticSink {
    /// Record a diagnostic
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// A collection of diagnostics
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.kind == Some(kind))
    }

    /// Get all diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the count
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}
