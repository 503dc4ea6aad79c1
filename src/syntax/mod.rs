//! Syntax module for the codegraft mini-language
//!
//! Core Abstract Syntax Tree types for an ES-module-flavoured language
//! subset, with source location tracking and comment annotations, plus the
//! parser and printer that convert between text and trees.
//!
//! Node kinds form a closed tagged-variant set so normalization and equality
//! can be implemented exhaustively rather than reflectively.

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod printer;

pub use printer::{FormatOptions, QuoteStyle};

// ============================================================================
// POSITION AND ANNOTATION METADATA
// ============================================================================

/// A byte span in the source text. Position metadata only: never
/// semantically meaningful, always excluded from structural comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment annotation attached to a statement or object property.
/// `text` is the raw interior, without the `//` or `/* */` delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub leading: bool,
}

// ============================================================================
// TREE ROOT
// ============================================================================

/// Root container: an ordered sequence of top-level statements. Order is
/// semantically significant and preserved across edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
    /// Comments after the last statement in the file.
    pub trailing_comments: Vec<Comment>,
    pub span: Span,
}

impl Module {
    /// Indices of every import declaration, in document order.
    pub fn import_indices(&self) -> Vec<usize> {
        self.body
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_import())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn imports(&self) -> impl Iterator<Item = (usize, &ImportDecl)> {
        self.body.iter().enumerate().filter_map(|(i, s)| match &s.kind {
            StmtKind::Import(decl) => Some((i, decl)),
            _ => None,
        })
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    /// Leading and trailing comment annotations, in order.
    pub comments: Vec<Comment>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Import(ImportDecl),
    Expr(Expr),
    VarDecl(VarDecl),
    ExportDefault(Expr),
    /// Blank-line sentinel. Spliced by edits, and folded from blank-line
    /// runs between top-level statements when parsing a root source; never
    /// produced for fragments.
    Blank,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            kind,
            comments: Vec::new(),
            span,
        }
    }

    pub fn blank() -> Self {
        Self::new(StmtKind::Blank, Span::default())
    }

    pub fn is_import(&self) -> bool {
        matches!(self.kind, StmtKind::Import(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, StmtKind::Blank)
    }

    pub fn as_import(&self) -> Option<&ImportDecl> {
        match &self.kind {
            StmtKind::Import(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_import_mut(&mut self) -> Option<&mut ImportDecl> {
        match &mut self.kind {
            StmtKind::Import(decl) => Some(decl),
            _ => None,
        }
    }
}

// ============================================================================
// IMPORTS
// ============================================================================

/// `import <specifiers> from '<source>';` or a bare `import '<source>';`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

/// One import binding: the exported name paired with the local name it is
/// bound to. Identity is the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub exported: Exported,
    pub local: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exported {
    Named(String),
    Default,
    Namespace,
}

impl ImportSpecifier {
    pub fn new(exported: Exported, local: impl Into<String>) -> Self {
        Self {
            exported,
            local: local.into(),
            span: Span::default(),
        }
    }

    /// Human-readable `[exported as local]` form for log messages.
    pub fn describe(&self) -> String {
        match &self.exported {
            Exported::Named(name) => format!("[{} as {}]", name, self.local),
            Exported::Default => format!("[default as {}]", self.local),
            Exported::Namespace => format!("[* as {}]", self.local),
        }
    }
}

/// Classification of an import source for placement decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Package,
    Relative,
}

/// A source is relative when it starts with `./` or `../`, otherwise it
/// names a package.
pub fn source_type(source: &str) -> SourceType {
    if source.starts_with("./") || source.starts_with("../") {
        SourceType::Relative
    } else {
        SourceType::Package
    }
}

// ============================================================================
// DECLARATIONS AND EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Const,
    Let,
    Var,
}

impl DeclKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Let => "let",
            DeclKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub decl_kind: DeclKind,
    pub name: String,
    /// Raw type annotation text. Type-annotation metadata: dropped from
    /// anchor comparisons, kept for membership comparisons.
    pub ty: Option<String>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Ident(name.into()), Span::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Ident(String),
    Str(String),
    /// Numeric literal, kept as raw text so printing never reformats it.
    Num(String),
    Bool(bool),
    Null,
    Member {
        object: Box<Expr>,
        property: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Object {
        properties: Vec<Property>,
    },
    Array {
        elements: Vec<Expr>,
    },
    Arrow {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: Expr,
    pub comments: Vec<Comment>,
    pub span: Span,
}
