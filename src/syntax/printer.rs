//! Printer for the codegraft mini-language.
//!
//! Serializes a `Module` back to text under caller-supplied formatting
//! options. The printer is deliberately deterministic: the same tree and
//! options always produce the same text, so idempotent edits produce
//! convergent output.

use serde::{Deserialize, Serialize};

use crate::syntax::{
    Comment, CommentKind, Expr, ExprKind, Exported, ImportDecl, Module, Property, Stmt, StmtKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

/// Formatting options, mirroring the printer collaborator interface:
/// indentation, quote style, trailing-comma policy, and maximum line width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    pub indent_width: usize,
    pub use_tabs: bool,
    pub quote: QuoteStyle,
    pub trailing_comma: bool,
    pub max_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            quote: QuoteStyle::Single,
            trailing_comma: true,
            max_width: 130,
        }
    }
}

impl FormatOptions {
    fn indent(&self, level: usize) -> String {
        if self.use_tabs {
            "\t".repeat(level)
        } else {
            " ".repeat(self.indent_width * level)
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Serialize a module to source text.
pub fn print(module: &Module, opts: &FormatOptions) -> String {
    let mut out = String::new();

    for stmt in &module.body {
        print_stmt(&mut out, stmt, opts);
    }

    for comment in &module.trailing_comments {
        out.push_str(&render_comment(comment, 0, opts));
        out.push('\n');
    }

    out
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn print_stmt(out: &mut String, stmt: &Stmt, opts: &FormatOptions) {
    if stmt.is_blank() {
        out.push('\n');
        return;
    }

    for comment in stmt.comments.iter().filter(|c| c.leading) {
        out.push_str(&render_comment(comment, 0, opts));
        out.push('\n');
    }

    let line = match &stmt.kind {
        StmtKind::Import(decl) => render_import(decl, opts),
        StmtKind::Expr(expr) => format!("{};", render_expr(expr, 0, opts)),
        StmtKind::VarDecl(decl) => {
            let mut s = format!("{} {}", decl.decl_kind.keyword(), decl.name);
            if let Some(ty) = &decl.ty {
                s.push_str(": ");
                s.push_str(ty);
            }
            if let Some(init) = &decl.init {
                s.push_str(" = ");
                s.push_str(&render_expr(init, 0, opts));
            }
            s.push(';');
            s
        }
        StmtKind::ExportDefault(expr) => format!("export default {};", render_expr(expr, 0, opts)),
        StmtKind::Blank => unreachable!(),
    };

    out.push_str(&line);

    for comment in stmt.comments.iter().filter(|c| !c.leading) {
        out.push(' ');
        out.push_str(&render_comment(comment, 0, opts));
    }

    out.push('\n');
}

fn render_import(decl: &ImportDecl, opts: &FormatOptions) -> String {
    let quoted = quote(&decl.source, opts);

    if decl.specifiers.is_empty() {
        return format!("import {};", quoted);
    }

    let mut clauses: Vec<String> = Vec::new();
    let mut named: Vec<String> = Vec::new();

    for spec in &decl.specifiers {
        match &spec.exported {
            Exported::Default => clauses.push(spec.local.clone()),
            Exported::Namespace => clauses.push(format!("* as {}", spec.local)),
            Exported::Named(name) => {
                if *name == spec.local {
                    named.push(name.clone())
                } else {
                    named.push(format!("{} as {}", name, spec.local))
                }
            }
        }
    }

    if !named.is_empty() {
        let single = format!("{{ {} }}", named.join(", "));
        let head_len = "import ".len() + clauses.iter().map(|c| c.len() + 2).sum::<usize>();
        if head_len + single.len() + " from ".len() + quoted.len() + 1 <= opts.max_width {
            clauses.push(single);
        } else {
            let indent = opts.indent(1);
            let mut block = String::from("{\n");
            for (i, item) in named.iter().enumerate() {
                block.push_str(&indent);
                block.push_str(item);
                if i + 1 < named.len() || opts.trailing_comma {
                    block.push(',');
                }
                block.push('\n');
            }
            block.push('}');
            clauses.push(block);
        }
    }

    format!("import {} from {};", clauses.join(", "), quoted)
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn render_expr(expr: &Expr, level: usize, opts: &FormatOptions) -> String {
    match &expr.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Str(value) => quote(value, opts),
        ExprKind::Num(raw) => raw.clone(),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Null => "null".to_string(),
        ExprKind::Member { object, property } => {
            format!("{}.{}", render_expr(object, level, opts), property)
        }
        ExprKind::Call { callee, args } => format!(
            "{}({})",
            render_expr(callee, level, opts),
            render_args(args, level, opts)
        ),
        ExprKind::New { callee, args } => format!(
            "new {}({})",
            render_expr(callee, level, opts),
            render_args(args, level, opts)
        ),
        ExprKind::Object { properties } => render_object(properties, level, opts),
        ExprKind::Array { elements } => {
            if elements.is_empty() {
                "[]".to_string()
            } else {
                format!("[ {} ]", render_args(elements, level, opts))
            }
        }
        ExprKind::Arrow { params, body } => {
            let rendered_body = render_expr(body, level, opts);
            // An object literal body needs parentheses to avoid reading as a block.
            let rendered_body = if matches!(body.kind, ExprKind::Object { .. }) {
                format!("({})", rendered_body)
            } else {
                rendered_body
            };
            format!("({}) => {}", params.join(", "), rendered_body)
        }
        ExprKind::Assign { target, value } => format!(
            "{} = {}",
            render_expr(target, level, opts),
            render_expr(value, level, opts)
        ),
    }
}

fn render_args(args: &[Expr], level: usize, opts: &FormatOptions) -> String {
    args.iter()
        .map(|a| render_expr(a, level, opts))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_object(properties: &[Property], level: usize, opts: &FormatOptions) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }

    let has_comments = properties.iter().any(|p| !p.comments.is_empty());

    if !has_comments {
        let single = format!(
            "{{ {} }}",
            properties
                .iter()
                .map(|p| format!("{}: {}", render_key(&p.key, opts), render_expr(&p.value, level, opts)))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if opts.indent(level).len() + single.len() <= opts.max_width {
            return single;
        }
    }

    let inner_indent = opts.indent(level + 1);
    let mut block = String::from("{\n");
    for (i, prop) in properties.iter().enumerate() {
        for comment in prop.comments.iter().filter(|c| c.leading) {
            block.push_str(&render_comment(comment, level + 1, opts));
            block.push('\n');
        }
        block.push_str(&inner_indent);
        block.push_str(&render_key(&prop.key, opts));
        block.push_str(": ");
        block.push_str(&render_expr(&prop.value, level + 1, opts));
        if i + 1 < properties.len() || opts.trailing_comma {
            block.push(',');
        }
        block.push('\n');
    }
    block.push_str(&opts.indent(level));
    block.push('}');
    block
}

fn render_key(key: &str, opts: &FormatOptions) -> String {
    let is_ident = !key.is_empty()
        && key
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            .unwrap_or(false)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        key.to_string()
    } else {
        quote(key, opts)
    }
}

// ============================================================================
// COMMENTS AND LITERALS
// ============================================================================

fn render_comment(comment: &Comment, level: usize, opts: &FormatOptions) -> String {
    let indent = opts.indent(level);
    match comment.kind {
        CommentKind::Line => format!("{}//{}", indent, comment.text),
        CommentKind::Block => format!("{}/*{}*/", indent, comment.text),
    }
}

fn quote(value: &str, opts: &FormatOptions) -> String {
    let (delim, escaped) = match opts.quote {
        QuoteStyle::Single => ('\'', value.replace('\\', "\\\\").replace('\'', "\\'")),
        QuoteStyle::Double => ('"', value.replace('\\', "\\\\").replace('"', "\\\"")),
    };
    let escaped = escaped.replace('\n', "\\n").replace('\t', "\\t");
    format!("{}{}{}", delim, escaped, delim)
}
