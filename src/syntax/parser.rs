//! Parser for the codegraft mini-language.
//!
//! Converts source text into a `Module` tree with source location tracking.
//! Purely syntactic: no binding resolution, no type checking. Comments at
//! statement and property boundaries are captured and attached as leading
//! annotations to the node that follows them.

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::{to_source_span, ErrorKind, ErrorReporting, GraftError, ReportContext, SourceContext};
use crate::syntax::{
    Comment, CommentKind, DeclKind, Expr, ExprKind, Exported, ImportDecl, ImportSpecifier, Module,
    Property, Span, Stmt, StmtKind, VarDecl,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GraftParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse source text into a module tree.
pub fn parse(source_text: &str, context: &SourceContext) -> Result<Module, GraftError> {
    let reporter = ReportContext::new(context.clone(), "parse");
    parse_with(source_text, &reporter, None)
}

/// Parse a code fragment (a candidate block, a search pattern, extra call
/// arguments). Failures are reported as recoverable fragment errors naming
/// `what`, rather than fatal source errors.
pub fn parse_fragment(code: &str, what: &str) -> Result<Vec<Stmt>, GraftError> {
    let context = SourceContext::from_file(what, code);
    let reporter = ReportContext::new(context, "fragment");
    let module = parse_with(code, &reporter, Some(what))?;
    Ok(module.body)
}

/// Parse a fragment expected to hold exactly one expression statement and
/// return its expression.
pub fn parse_expression(code: &str, what: &str) -> Result<Expr, GraftError> {
    let context = SourceContext::from_file(what, code);
    let reporter = ReportContext::new(context, "fragment");
    let body = parse_fragment(code, what)?;

    let mut stmts = body.into_iter();
    match (stmts.next(), stmts.next()) {
        (Some(stmt), None) => match stmt.kind {
            StmtKind::Expr(expr) => Ok(expr),
            _ => Err(reporter.malformed_fragment(what, "expected an expression", to_source_span(stmt.span))),
        },
        (None, _) => Err(reporter.empty_fragment(what)),
        (Some(_), Some(extra)) => Err(reporter.malformed_fragment(
            what,
            "expected a single expression",
            to_source_span(extra.span),
        )),
    }
}

// ============================================================================
// MODULE BUILDER
// ============================================================================

fn parse_with(
    source_text: &str,
    reporter: &ReportContext,
    fragment: Option<&str>,
) -> Result<Module, GraftError> {
    if source_text.trim().is_empty() {
        return Ok(Module::default());
    }

    let pairs = GraftParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, reporter, fragment))?;

    let program = pairs.peek().unwrap(); // pest guarantees the program rule exists

    // Blank-line runs between top-level items fold into a single sentinel,
    // so a printed tree reparses to the same tree. Fragments are inline code
    // snippets and never carry sentinels.
    let track_blanks = fragment.is_none();

    let mut body = Vec::new();
    let mut pending: Vec<Comment> = Vec::new();
    let mut prev_end: Option<usize> = None;

    for pair in program.into_inner() {
        let gap_is_blank = track_blanks
            && pending.is_empty()
            && prev_end
                .map(|end| has_blank_line(&source_text[end..pair.as_span().start()]))
                .unwrap_or(false);

        match pair.as_rule() {
            Rule::EOI => {
                if gap_is_blank && !body.is_empty() {
                    body.push(Stmt::blank());
                }
                break;
            }
            Rule::comment => {
                if gap_is_blank {
                    body.push(Stmt::blank());
                }
                prev_end = Some(pair.as_span().end());
                pending.push(build_comment(pair));
            }
            _ => {
                if gap_is_blank {
                    body.push(Stmt::blank());
                }
                prev_end = Some(pair.as_span().end());
                let comments = std::mem::take(&mut pending);
                let mut stmt = build_stmt(pair, reporter)?;
                stmt.comments = comments;
                body.push(stmt);
            }
        }
    }

    Ok(Module {
        body,
        trailing_comments: pending,
        span: Span {
            start: 0,
            end: source_text.len(),
        },
    })
}

/// A gap separates statements by a blank line when it spans more than one
/// line break.
fn has_blank_line(gap: &str) -> bool {
    gap.bytes().filter(|&b| b == b'\n').count() >= 2
}

fn build_comment(pair: Pair<Rule>) -> Comment {
    let inner = pair.into_inner().next().unwrap(); // grammar guarantees inner exists
    match inner.as_rule() {
        Rule::line_comment => Comment {
            kind: CommentKind::Line,
            text: inner.as_str()[2..].to_string(),
            leading: true,
        },
        _ => {
            let text = inner.as_str();
            Comment {
                kind: CommentKind::Block,
                text: text[2..text.len() - 2].to_string(),
                leading: true,
            }
        }
    }
}

// ============================================================================
// STATEMENT BUILDERS
// ============================================================================

fn build_stmt(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Stmt, GraftError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::import_decl => build_import_decl(pair, reporter),
        Rule::export_default => {
            let expr_pair = pair
                .into_inner()
                .find(is_expr_rule)
                .ok_or_else(|| missing(reporter, "exported expression", span))?;
            let expr = build_expr(expr_pair, reporter)?;
            Ok(Stmt::new(StmtKind::ExportDefault(expr), span))
        }
        Rule::var_decl => build_var_decl(pair, reporter),
        Rule::expr_stmt => {
            let expr_pair = pair
                .into_inner()
                .next()
                .ok_or_else(|| missing(reporter, "expression", span))?;
            let expr = build_expr(expr_pair, reporter)?;
            Ok(Stmt::new(StmtKind::Expr(expr), span))
        }
        rule => Err(reporter.malformed_fragment(
            "statement",
            &format!("unsupported rule: {:?}", rule),
            to_source_span(span),
        )),
    }
}

fn build_import_decl(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Stmt, GraftError> {
    let span = get_span(&pair);
    let mut specifiers = Vec::new();
    let mut source = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::import_clause => collect_specifiers(inner, &mut specifiers),
            Rule::string => source = Some(unquote(inner.as_str())),
            _ => {}
        }
    }

    let source = source.ok_or_else(|| missing(reporter, "import source", span))?;
    Ok(Stmt::new(
        StmtKind::Import(ImportDecl { source, specifiers }),
        span,
    ))
}

fn collect_specifiers(clause: Pair<Rule>, out: &mut Vec<ImportSpecifier>) {
    for pair in clause.into_inner() {
        match pair.as_rule() {
            Rule::default_import => {
                let span = get_span(&pair);
                let mut inner = pair.into_inner();
                let local = inner.next().unwrap().as_str(); // grammar guarantees the binding
                out.push(ImportSpecifier {
                    exported: Exported::Default,
                    local: local.to_string(),
                    span,
                });
                for rest in inner {
                    collect_specifiers_from(rest, out);
                }
            }
            _ => collect_specifiers_from(pair, out),
        }
    }
}

fn collect_specifiers_from(pair: Pair<Rule>, out: &mut Vec<ImportSpecifier>) {
    match pair.as_rule() {
        Rule::namespace_import => {
            let span = get_span(&pair);
            let local = pair
                .into_inner()
                .find(|p| p.as_rule() == Rule::ident)
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            out.push(ImportSpecifier {
                exported: Exported::Namespace,
                local,
                span,
            });
        }
        Rule::named_imports => {
            for spec in pair.into_inner() {
                let span = get_span(&spec);
                let mut inner = spec.into_inner();
                let exported_name = inner.next().unwrap().as_str(); // spec_name is mandatory
                let local = inner
                    .find(|p| p.as_rule() == Rule::ident)
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| exported_name.to_string());
                let exported = if exported_name == "default" {
                    Exported::Default
                } else {
                    Exported::Named(exported_name.to_string())
                };
                out.push(ImportSpecifier {
                    exported,
                    local,
                    span,
                });
            }
        }
        _ => {}
    }
}

fn build_var_decl(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Stmt, GraftError> {
    let span = get_span(&pair);
    let mut decl_kind = DeclKind::Const;
    let mut name = String::new();
    let mut ty = None;
    let mut init = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::decl_kind => {
                decl_kind = match inner.as_str().trim() {
                    "let" => DeclKind::Let,
                    "var" => DeclKind::Var,
                    _ => DeclKind::Const,
                }
            }
            Rule::ident => name = inner.as_str().to_string(),
            Rule::type_annot => {
                let text = inner
                    .into_inner()
                    .next()
                    .map(|t| t.as_str().trim().to_string())
                    .unwrap_or_default();
                ty = Some(text);
            }
            _ if is_expr_rule(&inner) => init = Some(build_expr(inner, reporter)?),
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(missing(reporter, "declared name", span));
    }

    Ok(Stmt::new(
        StmtKind::VarDecl(VarDecl {
            decl_kind,
            name,
            ty,
            init,
        }),
        span,
    ))
}

// ============================================================================
// EXPRESSION BUILDERS
// ============================================================================

fn is_expr_rule(pair: &Pair<Rule>) -> bool {
    matches!(
        pair.as_rule(),
        Rule::assign | Rule::arrow_fn | Rule::new_expr | Rule::postfix_expr
    )
}

fn build_expr(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Expr, GraftError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::assign => {
            let mut inner = pair.into_inner();
            let target_pair = inner
                .next()
                .ok_or_else(|| missing(reporter, "assignment target", span))?;
            let value_pair = inner
                .next()
                .ok_or_else(|| missing(reporter, "assigned value", span))?;
            let target = build_expr(target_pair, reporter)?;
            let value = build_expr(value_pair, reporter)?;
            Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ))
        }

        Rule::arrow_fn => {
            let mut params = Vec::new();
            let mut body = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::arrow_params => {
                        params = inner.into_inner().map(|p| p.as_str().to_string()).collect()
                    }
                    _ if is_expr_rule(&inner) => body = Some(build_expr(inner, reporter)?),
                    _ => {}
                }
            }
            let body = body.ok_or_else(|| missing(reporter, "arrow function body", span))?;
            Ok(Expr::new(
                ExprKind::Arrow {
                    params,
                    body: Box::new(body),
                },
                span,
            ))
        }

        Rule::new_expr => {
            let mut callee = None;
            let mut ctor_args = None;
            let mut trailing = Vec::new();
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::member_chain => callee = Some(build_member_chain(inner, reporter)?),
                    Rule::call_args if ctor_args.is_none() => {
                        ctor_args = Some(build_args(inner, reporter)?)
                    }
                    Rule::call_args | Rule::member_access => trailing.push(inner),
                    _ => {}
                }
            }
            let callee = callee.ok_or_else(|| missing(reporter, "constructed expression", span))?;
            let base = Expr::new(
                ExprKind::New {
                    callee: Box::new(callee),
                    args: ctor_args.unwrap_or_default(),
                },
                span,
            );
            fold_postfix(base, trailing, span, reporter)
        }

        Rule::postfix_expr => {
            let mut inner = pair.into_inner();
            let primary = inner
                .next()
                .ok_or_else(|| missing(reporter, "expression", span))?;
            let base = build_primary(primary, reporter)?;
            fold_postfix(base, inner.collect(), span, reporter)
        }

        rule => Err(reporter.malformed_fragment(
            "expression",
            &format!("unsupported rule: {:?}", rule),
            to_source_span(span),
        )),
    }
}

fn build_member_chain(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Expr, GraftError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let primary = inner
        .next()
        .ok_or_else(|| missing(reporter, "expression", span))?;
    let base = build_primary(primary, reporter)?;
    fold_postfix(base, inner.collect(), span, reporter)
}

fn fold_postfix(
    base: Expr,
    postfix: Vec<Pair<Rule>>,
    span: Span,
    reporter: &ReportContext,
) -> Result<Expr, GraftError> {
    let mut expr = base;
    for pair in postfix {
        expr = match pair.as_rule() {
            Rule::member_access => {
                let property = pair
                    .into_inner()
                    .next()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                Expr::new(
                    ExprKind::Member {
                        object: Box::new(expr),
                        property,
                    },
                    span,
                )
            }
            Rule::call_args => {
                let args = build_args(pair, reporter)?;
                Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                )
            }
            _ => expr,
        };
    }
    Ok(expr)
}

fn build_args(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Vec<Expr>, GraftError> {
    pair.into_inner().map(|p| build_expr(p, reporter)).collect()
}

fn build_primary(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Expr, GraftError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::ident => Ok(Expr::new(ExprKind::Ident(pair.as_str().to_string()), span)),
        Rule::string => Ok(Expr::new(ExprKind::Str(unquote(pair.as_str())), span)),
        Rule::number => Ok(Expr::new(ExprKind::Num(pair.as_str().to_string()), span)),
        Rule::boolean => Ok(Expr::new(ExprKind::Bool(pair.as_str() == "true"), span)),
        Rule::null_lit => Ok(Expr::new(ExprKind::Null, span)),
        Rule::paren => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| missing(reporter, "parenthesized expression", span))?;
            build_expr(inner, reporter)
        }
        Rule::object => {
            let properties = pair
                .into_inner()
                .map(|p| build_property(p, reporter))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprKind::Object { properties }, span))
        }
        Rule::array => {
            let elements = build_args(pair, reporter)?;
            Ok(Expr::new(ExprKind::Array { elements }, span))
        }
        rule => Err(reporter.malformed_fragment(
            "expression",
            &format!("unsupported rule: {:?}", rule),
            to_source_span(span),
        )),
    }
}

fn build_property(pair: Pair<Rule>, reporter: &ReportContext) -> Result<Property, GraftError> {
    let span = get_span(&pair);
    let mut comments = Vec::new();
    let mut key = String::new();
    let mut value = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::comment => comments.push(build_comment(inner)),
            Rule::prop_key => {
                let raw = inner.into_inner().next().unwrap(); // ident or string
                key = match raw.as_rule() {
                    Rule::string => unquote(raw.as_str()),
                    _ => raw.as_str().to_string(),
                };
            }
            _ if is_expr_rule(&inner) => value = Some(build_expr(inner, reporter)?),
            _ => {}
        }
    }

    let value = value.ok_or_else(|| missing(reporter, "property value", span))?;
    Ok(Property {
        key,
        value,
        comments,
        span,
    })
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn missing(reporter: &ReportContext, element: &str, span: Span) -> GraftError {
    reporter.malformed_fragment(element, "missing element", to_source_span(span))
}

/// Strip surrounding quotes and unescape the interior.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(
    error: Error<Rule>,
    reporter: &ReportContext,
    fragment: Option<&str>,
) -> GraftError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let rendered = error.to_string();
    let message = if rendered.contains("expected \"'\"") || rendered.contains("expected \"\\\"\"") {
        "missing closing quote"
    } else if rendered.contains("expected \")\"") {
        "missing closing parenthesis"
    } else if rendered.contains("expected \"}\"") {
        "missing closing brace"
    } else {
        "syntax error"
    };

    match fragment {
        Some(what) => reporter.malformed_fragment(what, message, to_source_span(span)),
        None => reporter.report(
            ErrorKind::MalformedSource {
                construct: message.to_string(),
            },
            to_source_span(span),
        ),
    }
}
