//! Transformation runner: one parse→edit→print cycle per call.
//!
//! A run owns one freshly parsed tree exclusively; transforms mutate it in
//! place through a `Session` and the tree is serialized and discarded at the
//! end. Nothing persists across runs, so idempotence is always re-derived
//! from tree content.

use crate::errors::{ErrorKind, ErrorReporting, GraftError, ReportContext, SourceContext};
use crate::logger::Logger;
use crate::syntax::printer::{print, FormatOptions};
use crate::syntax::{parser, Module};

/// The source text to transform, with the path it came from (used for
/// diagnostics only; the runner never touches the filesystem).
#[derive(Debug, Clone, Copy)]
pub struct FileInfo<'a> {
    pub path: &'a str,
    pub source: &'a str,
}

/// What to do when a run hits a fatal condition, or when an operation fails
/// recoverably: keep going and return the original text, or surface the
/// error to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Continue,
    Propagate,
}

#[derive(Default)]
pub struct RunOptions {
    pub error_policy: ErrorPolicy,
    pub format: FormatOptions,
    pub logger: Logger,
}

// ============================================================================
// SESSION
// ============================================================================

/// Mutable state handed to a transform: the tree, the diagnostics source,
/// and the logging/error-policy plumbing.
pub struct Session<'a> {
    pub module: &'a mut Module,
    source: SourceContext,
    /// The depth the session was created at; every title logs here.
    base_logger: Logger,
    logger: Logger,
    error_policy: ErrorPolicy,
}

impl<'a> Session<'a> {
    pub fn new(
        module: &'a mut Module,
        source: SourceContext,
        logger: Logger,
        error_policy: ErrorPolicy,
    ) -> Self {
        Self {
            module,
            source,
            base_logger: logger.clone(),
            logger,
            error_policy,
        }
    }

    /// Log the operation heading and indent subsequent messages one level
    /// under it. Titles always log at the session's own depth, so the
    /// transforms of a pipeline read as siblings rather than a staircase.
    pub fn title(&mut self, message: &str) {
        self.base_logger.info(message);
        self.logger = self.base_logger.nested();
    }

    pub fn info(&self, message: &str) {
        self.logger.info(message);
    }

    /// Warnings mark expected idempotence outcomes (already present, already
    /// bound). They are reported and never propagate.
    pub fn warning(&self, message: &str) {
        self.logger.warning(message);
    }

    /// Report a recoverable failure. The operation is abandoned with zero
    /// side effects; under `Propagate` the error surfaces to the caller.
    pub fn recoverable(&self, error: GraftError) -> Result<(), GraftError> {
        self.logger.error(&error.to_string());
        match self.error_policy {
            ErrorPolicy::Continue => Ok(()),
            ErrorPolicy::Propagate => Err(error),
        }
    }
}

impl ErrorReporting for Session<'_> {
    fn report(&self, kind: ErrorKind, span: miette::SourceSpan) -> GraftError {
        ReportContext::new(self.source.clone(), "edit").report(kind, span)
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// One structural edit over a module tree.
pub trait Transform {
    fn name(&self) -> &'static str;

    fn apply(&self, session: &mut Session) -> Result<(), GraftError>;
}

/// Applies several transforms in sequence against the same tree, within a
/// single parse→print cycle.
pub struct Pipeline<'t> {
    pub transforms: Vec<&'t dyn Transform>,
}

impl Transform for Pipeline<'_> {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        for transform in &self.transforms {
            transform.apply(session)?;
        }
        Ok(())
    }
}

// ============================================================================
// RUN CYCLE
// ============================================================================

/// Parse the source, apply the transform, and print the result.
///
/// A malformed root source is fatal: under `ErrorPolicy::Continue` the
/// original text is returned byte-for-byte so malformed output is never
/// emitted; under `Propagate` the parse error surfaces. The same policy
/// applies to an error escaping the transform itself.
pub fn run_transformation(
    file: &FileInfo,
    transform: &dyn Transform,
    options: &RunOptions,
) -> Result<String, GraftError> {
    let logger = &options.logger;
    logger.info(&format!(
        "Running transformation {}\n  for file: {}",
        transform.name(),
        file.path
    ));

    let context = SourceContext::from_file(file.path, file.source);

    let mut module = match parser::parse(file.source, &context) {
        Ok(module) => module,
        Err(error) => return bail(file, transform, error, options),
    };

    let applied = {
        let mut session = Session::new(
            &mut module,
            context,
            logger.nested(),
            options.error_policy,
        );
        transform.apply(&mut session)
    };

    match applied {
        Ok(()) => Ok(print(&module, &options.format)),
        Err(error) => bail(file, transform, error, options),
    }
}

fn bail(
    file: &FileInfo,
    transform: &dyn Transform,
    error: GraftError,
    options: &RunOptions,
) -> Result<String, GraftError> {
    options.logger.error(&format!(
        "Failed to run transformation '{}': {}",
        transform.name(),
        error
    ));

    match options.error_policy {
        ErrorPolicy::Continue => {
            options
                .logger
                .info("Continuing without transformation, returning original source.");
            Ok(file.source.to_string())
        }
        ErrorPolicy::Propagate => Err(error),
    }
}
