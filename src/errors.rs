//! Codegraft Error Handling - Unified Encapsulated API
//!
//! One error type for the whole crate: a kind, the source it happened in,
//! and the diagnostic metadata miette needs to render it.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;

use crate::syntax::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source context for error reporting. Carries the file name and full content
/// so diagnostics can render labeled snippets.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("// {}", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// The single error type - no wrapper, no variants, just essential data.
#[derive(Debug)]
pub struct GraftError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to present it
    pub diagnostic_info: DiagnosticInfo,
}

/// All error kinds as a clean enum.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// The root source text could not be parsed. Fatal to the run.
    #[error("Parse error: malformed source: {construct}")]
    MalformedSource { construct: String },

    /// A candidate or search fragment could not be parsed. Recoverable.
    #[error("Parse error: failed to parse {what}: {construct}")]
    MalformedFragment { what: String, construct: String },

    /// A candidate or search fragment contained no statements. Recoverable.
    #[error("{what} is empty")]
    EmptyFragment { what: String },

    /// The requested search pattern has no contiguous match. Recoverable.
    #[error("Search pattern not found among top-level statements")]
    AnchorNotFound,

    /// A binding-name collision or a partial block presence under a policy
    /// that forbids partial application.
    #[error("Duplicate conflict: {detail}")]
    DuplicateConflict { detail: String },

    /// A required structural element is missing from the tree.
    #[error("Structural element not found: {element}")]
    MissingStructure { element: String },

    /// Filesystem failure in the CLI surface.
    #[error("IO error on '{path}': {message}")]
    Io { path: String, message: String },
}

/// Context-specific source information.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl ErrorKind {
    /// Get the error category for test assertions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedSource { .. }
            | Self::MalformedFragment { .. }
            | Self::EmptyFragment { .. } => ErrorCategory::Parse,
            Self::AnchorNotFound => ErrorCategory::Anchor,
            Self::DuplicateConflict { .. } => ErrorCategory::Duplicate,
            Self::MissingStructure { .. } => ErrorCategory::Structure,
            Self::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Get error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MalformedSource { .. } => "malformed_source",
            Self::MalformedFragment { .. } => "malformed_fragment",
            Self::EmptyFragment { .. } => "empty_fragment",
            Self::AnchorNotFound => "anchor_not_found",
            Self::DuplicateConflict { .. } => "duplicate_conflict",
            Self::MissingStructure { .. } => "missing_structure",
            Self::Io { .. } => "io",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Anchor,
    Duplicate,
    Structure,
    Io,
}

impl std::error::Error for GraftError {}

impl fmt::Display for GraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for GraftError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl GraftError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::MalformedSource { .. } => "malformed syntax".into(),
            ErrorKind::MalformedFragment { .. } => "fragment rejected here".into(),
            ErrorKind::EmptyFragment { .. } => "empty fragment".into(),
            ErrorKind::AnchorNotFound => "no matching statement run".into(),
            ErrorKind::DuplicateConflict { .. } => "conflicting binding".into(),
            ErrorKind::MissingStructure { .. } => "expected element here".into(),
            ErrorKind::Io { .. } => "io failure".into(),
        }
    }

    /// Attach a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

// ============================================================================
// ERROR CREATION
// ============================================================================

/// Context-aware error creation - each context knows how to create
/// appropriately coded and sourced errors.
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements.
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError;

    fn malformed_fragment(&self, what: &str, construct: &str, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::MalformedFragment {
                what: what.into(),
                construct: construct.into(),
            },
            span,
        )
    }

    fn empty_fragment(&self, what: &str) -> GraftError {
        self.report(
            ErrorKind::EmptyFragment { what: what.into() },
            unspanned(),
        )
    }

    fn anchor_not_found(&self) -> GraftError {
        self.report(ErrorKind::AnchorNotFound, unspanned())
    }

    fn duplicate_conflict(&self, detail: impl Into<String>, span: SourceSpan) -> GraftError {
        self.report(
            ErrorKind::DuplicateConflict {
                detail: detail.into(),
            },
            span,
        )
    }

    fn missing_structure(&self, element: impl Into<String>) -> GraftError {
        self.report(
            ErrorKind::MissingStructure {
                element: element.into(),
            },
            unspanned(),
        )
    }
}

/// General-purpose error creation context tying a phase name to a source.
pub struct ReportContext {
    pub source: SourceContext,
    pub phase: String,
}

impl ReportContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for ReportContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GraftError {
        let error_code = format!("codegraft::{}::{}", self.phase, kind.code_suffix());

        GraftError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

/// Standalone constructor for CLI IO failures, which have no source text to
/// point into.
pub fn io_error(path: &std::path::Path, err: &std::io::Error) -> GraftError {
    let kind = ErrorKind::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    };
    let code = format!("codegraft::cli::{}", kind.code_suffix());
    GraftError {
        kind,
        source_info: SourceInfo {
            source: SourceContext::fallback("io").to_named_source(),
            primary_span: unspanned(),
            phase: "cli".into(),
        },
        diagnostic_info: DiagnosticInfo {
            help: None,
            error_code: code,
        },
    }
}

/// Creates a placeholder span for errors not tied to a specific source code
/// location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Converts an AST span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

/// Prints a GraftError with full miette diagnostics.
pub fn print_error(error: GraftError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
