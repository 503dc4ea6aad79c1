//! Node normalization and structural equality.
//!
//! Two independently parsed but textually identical nodes must compare
//! equal, so comparison happens on copies with the incidental metadata
//! stripped at every nesting level. Only named metadata categories are ever
//! dropped; structural fields always participate, and absence of an
//! optional attribute stays distinct from presence with a default value.

use crate::syntax::{Expr, ExprKind, ImportSpecifier, Property, Span, Stmt, StmtKind, VarDecl};

/// Metadata categories to strip before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSet {
    pub spans: bool,
    pub comments: bool,
    pub type_annotations: bool,
}

impl DropSet {
    /// The "already present" notion used by membership tests: position and
    /// annotation metadata never count, type annotations do.
    pub fn for_membership() -> Self {
        Self {
            spans: true,
            comments: true,
            type_annotations: false,
        }
    }

    /// Anchor resolution additionally ignores type annotations, so a search
    /// pattern written without them still matches annotated code.
    pub fn for_anchor() -> Self {
        Self {
            spans: true,
            comments: true,
            type_annotations: true,
        }
    }
}

/// True iff the two statements are semantically identical once the selected
/// metadata is stripped from both, at every nesting level. This is the sole
/// definition of "already present" used across the engine.
pub fn structurally_equal(a: &Stmt, b: &Stmt, drop: &DropSet) -> bool {
    normalize_stmt(a, drop) == normalize_stmt(b, drop)
}

/// Does a structurally equal statement already exist anywhere in `body`?
pub fn stmt_exists(body: &[Stmt], candidate: &Stmt, drop: &DropSet) -> bool {
    let needle = normalize_stmt(candidate, drop);
    body.iter().any(|s| normalize_stmt(s, drop) == needle)
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// A copy of `stmt` with the selected metadata removed at every level.
pub fn normalize_stmt(stmt: &Stmt, drop: &DropSet) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::Import(decl) => {
            let mut decl = decl.clone();
            for spec in &mut decl.specifiers {
                normalize_specifier(spec, drop);
            }
            StmtKind::Import(decl)
        }
        StmtKind::Expr(expr) => StmtKind::Expr(normalize_expr(expr, drop)),
        StmtKind::VarDecl(decl) => StmtKind::VarDecl(normalize_var_decl(decl, drop)),
        StmtKind::ExportDefault(expr) => StmtKind::ExportDefault(normalize_expr(expr, drop)),
        StmtKind::Blank => StmtKind::Blank,
    };

    Stmt {
        kind,
        comments: if drop.comments {
            Vec::new()
        } else {
            stmt.comments.clone()
        },
        span: drop_span(stmt.span, drop),
    }
}

/// A copy of `expr` with the selected metadata removed at every level.
pub fn normalize_expr(expr: &Expr, drop: &DropSet) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Ident(_)
        | ExprKind::Str(_)
        | ExprKind::Num(_)
        | ExprKind::Bool(_)
        | ExprKind::Null => expr.kind.clone(),
        ExprKind::Member { object, property } => ExprKind::Member {
            object: Box::new(normalize_expr(object, drop)),
            property: property.clone(),
        },
        ExprKind::Call { callee, args } => ExprKind::Call {
            callee: Box::new(normalize_expr(callee, drop)),
            args: args.iter().map(|a| normalize_expr(a, drop)).collect(),
        },
        ExprKind::New { callee, args } => ExprKind::New {
            callee: Box::new(normalize_expr(callee, drop)),
            args: args.iter().map(|a| normalize_expr(a, drop)).collect(),
        },
        ExprKind::Object { properties } => ExprKind::Object {
            properties: properties
                .iter()
                .map(|p| normalize_property(p, drop))
                .collect(),
        },
        ExprKind::Array { elements } => ExprKind::Array {
            elements: elements.iter().map(|e| normalize_expr(e, drop)).collect(),
        },
        ExprKind::Arrow { params, body } => ExprKind::Arrow {
            params: params.clone(),
            body: Box::new(normalize_expr(body, drop)),
        },
        ExprKind::Assign { target, value } => ExprKind::Assign {
            target: Box::new(normalize_expr(target, drop)),
            value: Box::new(normalize_expr(value, drop)),
        },
    };

    Expr {
        kind,
        span: drop_span(expr.span, drop),
    }
}

fn normalize_var_decl(decl: &VarDecl, drop: &DropSet) -> VarDecl {
    VarDecl {
        decl_kind: decl.decl_kind,
        name: decl.name.clone(),
        ty: if drop.type_annotations {
            None
        } else {
            decl.ty.clone()
        },
        init: decl.init.as_ref().map(|e| normalize_expr(e, drop)),
    }
}

fn normalize_property(prop: &Property, drop: &DropSet) -> Property {
    Property {
        key: prop.key.clone(),
        value: normalize_expr(&prop.value, drop),
        comments: if drop.comments {
            Vec::new()
        } else {
            prop.comments.clone()
        },
        span: drop_span(prop.span, drop),
    }
}

fn normalize_specifier(spec: &mut ImportSpecifier, drop: &DropSet) {
    spec.span = drop_span(spec.span, drop);
}

fn drop_span(span: Span, drop: &DropSet) -> Span {
    if drop.spans {
        Span::default()
    } else {
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceContext;
    use crate::syntax::parser::parse;

    fn stmts(src: &str) -> Vec<Stmt> {
        parse(src, &SourceContext::from_file("test", src))
            .unwrap()
            .body
    }

    #[test]
    fn equal_modulo_whitespace_and_position() {
        let a = &stmts("Vue.use(Router);")[0];
        let b = &stmts("\n\nVue.use( Router )")[0];
        assert!(structurally_equal(a, b, &DropSet::for_membership()));
    }

    #[test]
    fn comments_do_not_affect_equality() {
        let a = &stmts("// title\nVue.use(Router);")[0];
        let b = &stmts("Vue.use(Router);")[0];
        assert!(structurally_equal(a, b, &DropSet::for_membership()));
    }

    #[test]
    fn type_annotations_matter_for_membership_but_not_anchors() {
        let a = &stmts("const r: Router = new Router();")[0];
        let b = &stmts("const r = new Router();")[0];
        assert!(!structurally_equal(a, b, &DropSet::for_membership()));
        assert!(structurally_equal(a, b, &DropSet::for_anchor()));
    }

    #[test]
    fn structural_differences_survive_normalization() {
        let a = &stmts("Vue.use(Router);")[0];
        let b = &stmts("Vue.use(Store);")[0];
        assert!(!structurally_equal(a, b, &DropSet::for_membership()));
    }

    #[test]
    fn membership_scans_whole_body() {
        let body = stmts("import Vue from 'vue';\nVue.use(Router);\nfoo();");
        let candidate = &stmts("Vue.use(Router);")[0];
        assert!(stmt_exists(&body, candidate, &DropSet::for_membership()));

        let absent = &stmts("Vue.use(Vuex);")[0];
        assert!(!stmt_exists(&body, absent, &DropSet::for_membership()));
    }
}
