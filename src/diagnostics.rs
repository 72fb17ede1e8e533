use std::fmt;

use thiserror::Error;

use crate::position::SourceSpan;

/// Classification of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Parser,
    Runtime,
}

/// Failure raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("illegal character `{character}`")]
    IllegalCharacter { character: char, span: SourceSpan },
}

impl LexError {
    pub fn span(&self) -> SourceSpan {
        match self {
            LexError::IllegalCharacter { span, .. } => *span,
        }
    }
}

/// First grammar mismatch found by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct SyntaxError {
    pub span: SourceSpan,
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    UndefinedEntryPoint,
    UnreachableGotoTarget,
    DivisionByZero,
    InvalidLineRange,
    TypeMismatch,
    ArithmeticOverflow,
    /// Raised when a step hook asks the interpreter to stop.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Option<SourceSpan>,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: None,
            message: message.into(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Unified error type for the Zetri toolchain.
#[derive(Debug, Error)]
pub enum ZetriError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZetriError {
    /// Renderer-facing view of the error, if it originated in source text.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            ZetriError::Lex(err) => Some(Diagnostic::from(err)),
            ZetriError::Syntax(err) => Some(Diagnostic::from(err)),
            ZetriError::Runtime(err) => Some(Diagnostic::from(err)),
            ZetriError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZetriError>;

/// A `(position, message)` pair plus notes, ready to be shown to a user.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Formats the diagnostic with an excerpt of `source`, underlining the
    /// offending range with carets on every line it touches.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let Some(span) = self.span else {
            out.push_str(&format!("{:?} error: {}\n", self.kind, self.message));
            self.render_notes(&mut out);
            return out;
        };

        let start = span.start_position(source);
        out.push_str(&format!(
            "{:?} error at line {}, column {}: {}\n",
            self.kind,
            start.line(),
            start.column(),
            self.message
        ));

        let span_start = start.offset();
        let end = span.end.max(span_start + 1).min(source.len());
        let mut line_start = start.line_start();
        loop {
            let line_end = source[line_start..]
                .find('\n')
                .map(|idx| line_start + idx)
                .unwrap_or(source.len());
            let line = &source[line_start..line_end];
            let from = span_start.max(line_start);
            let to = end.min(line_end).max(from);
            let pad = source[line_start..from].chars().count();
            let width = source[from..to].chars().count().max(1);
            out.push_str(line);
            out.push('\n');
            out.push_str(&" ".repeat(pad));
            out.push_str(&"^".repeat(width));
            out.push('\n');
            if line_end >= end || line_end >= source.len() {
                break;
            }
            line_start = line_end + 1;
        }
        self.render_notes(&mut out);
        out
    }

    fn render_notes(&self, out: &mut String) {
        for note in &self.notes {
            out.push_str(&format!("  note: {note}\n"));
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        if !self.notes.is_empty() {
            writeln!(f)?;
            for note in &self.notes {
                writeln!(f, "  note: {note}")?;
            }
        }
        Ok(())
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        Diagnostic::new(DiagnosticKind::Lexer, err.to_string()).with_span(err.span())
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(err: &SyntaxError) -> Self {
        Diagnostic::new(DiagnosticKind::Parser, err.to_string()).with_span(err.span)
    }
}

impl From<&RuntimeError> for Diagnostic {
    fn from(err: &RuntimeError) -> Self {
        let diagnostic = Diagnostic::new(DiagnosticKind::Runtime, err.message.clone())
            .with_note(format!("{:?}", err.kind));
        match err.span {
            Some(span) => diagnostic.with_span(span),
            None => diagnostic,
        }
    }
}
