//! Property insertion into a constructor's configuration object literal.
//!
//! Targets the options object of a top-level `new Ctor({ ... })` expression,
//! following one level of identifier indirection: when the constructor is
//! called as `new Ctor(options)`, the object is taken from the initializer of
//! the top-level `options` declaration. Presence is keyed on the property
//! name, so re-adding a key is a reported no-op.

use serde::{Deserialize, Serialize};

use crate::edit::comments::create_comments;
use crate::errors::{ErrorReporting, GraftError};
use crate::runner::{Session, Transform};
use crate::syntax::{parser, Expr, Exported, ExprKind, Module, Property, Span, Stmt, StmtKind};

/// How the constructed identifier is named: directly, or as whatever local
/// name the default import of a module is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructorRef {
    Ident(String),
    /// The local binding of `import X from '<source>';`.
    DefaultImportOf(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddConfigProperty {
    pub constructor: ConstructorRef,
    pub key: String,
    /// The property value as raw expression code.
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Where the configuration object literal lives.
enum ObjectSite {
    /// First argument of the `new` expression in statement `stmt`.
    Inline { stmt: usize },
    /// Initializer of the top-level variable declaration at `stmt`.
    VarInit { stmt: usize },
}

impl Transform for AddConfigProperty {
    fn name(&self) -> &'static str {
        "add-config-property"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        session.title(&format!("Set configuration option '{}'.", self.key));

        let Some(ctor) = self.resolve_constructor(session)? else {
            return Ok(());
        };

        let value = match parser::parse_expression(&self.value, "option value") {
            Ok(expr) => expr,
            Err(error) => return session.recoverable(error),
        };

        let site = match self.locate_object(session, &ctor) {
            Ok(Some(site)) => site,
            Ok(None) => return Ok(()), // Key already present, reported.
            Err(error) => return session.recoverable(error),
        };

        let mut property = Property {
            key: self.key.clone(),
            value,
            comments: Vec::new(),
            span: Span::default(),
        };
        if let Some(comment) = &self.comment {
            property.comments = create_comments(comment, true, true);
        }

        let properties = match site {
            ObjectSite::Inline { stmt } => {
                object_in_new_mut(&mut session.module.body[stmt], &ctor)
            }
            ObjectSite::VarInit { stmt } => object_in_init_mut(&mut session.module.body[stmt]),
        };
        // The site was validated against the same tree just above.
        if let Some(properties) = properties {
            properties.push(property);
        }
        Ok(())
    }
}

impl AddConfigProperty {
    /// The identifier the `new` expression must construct. `Ok(None)` means
    /// the reference could not be resolved and was reported.
    fn resolve_constructor(&self, session: &Session) -> Result<Option<String>, GraftError> {
        match &self.constructor {
            ConstructorRef::Ident(name) => Ok(Some(name.clone())),
            ConstructorRef::DefaultImportOf(source) => {
                let local = session
                    .module
                    .imports()
                    .filter(|(_, d)| d.source == *source)
                    .flat_map(|(_, d)| d.specifiers.iter())
                    .find(|s| s.exported == Exported::Default)
                    .map(|s| s.local.clone());

                match local {
                    Some(local) => Ok(Some(local)),
                    None => session
                        .recoverable(session.missing_structure(format!(
                            "default import of '{}'",
                            source
                        )))
                        .map(|_| None),
                }
            }
        }
    }

    /// Find the configuration object and check the key. `Ok(None)` means the
    /// key is already present (reported as a warning).
    fn locate_object(
        &self,
        session: &Session,
        ctor: &str,
    ) -> Result<Option<ObjectSite>, GraftError> {
        let module = &*session.module;

        let Some((stmt, first_arg)) = find_construction(module, ctor) else {
            return Err(session.missing_structure(format!("new {}(...)", ctor)));
        };

        match &first_arg.kind {
            ExprKind::Object { properties } => {
                if self.key_present(session, properties) {
                    return Ok(None);
                }
                Ok(Some(ObjectSite::Inline { stmt }))
            }
            ExprKind::Ident(name) => {
                let Some((var_stmt, init)) = find_initializer(module, name) else {
                    return Err(session.missing_structure(format!(
                        "initialized declaration of '{}'",
                        name
                    )));
                };
                let ExprKind::Object { properties } = &init.kind else {
                    return Err(session.missing_structure(format!(
                        "object literal initializer of '{}'",
                        name
                    )));
                };
                if self.key_present(session, properties) {
                    return Ok(None);
                }
                Ok(Some(ObjectSite::VarInit { stmt: var_stmt }))
            }
            _ => Err(session.missing_structure(format!(
                "configuration object argument of new {}(...)",
                ctor
            ))),
        }
    }

    fn key_present(&self, session: &Session, properties: &[Property]) -> bool {
        let present = properties.iter().any(|p| p.key == self.key);
        if present {
            session.warning(&format!(
                "Option '{}' already exists and will be (safely) ignored.",
                self.key
            ));
        }
        present
    }
}

/// First top-level statement containing `new <ctor>(arg, ...)`, with the
/// first argument.
fn find_construction<'m>(module: &'m Module, ctor: &str) -> Option<(usize, &'m Expr)> {
    module.body.iter().enumerate().find_map(|(i, stmt)| {
        stmt_exprs(stmt)
            .into_iter()
            .find_map(|e| find_new(e, ctor))
            .and_then(|args| args.first())
            .map(|arg| (i, arg))
    })
}

/// Initializer of the top-level variable declaration binding `name`.
fn find_initializer<'m>(module: &'m Module, name: &str) -> Option<(usize, &'m Expr)> {
    module.body.iter().enumerate().find_map(|(i, stmt)| match &stmt.kind {
        StmtKind::VarDecl(decl) if decl.name == name => {
            decl.init.as_ref().map(|init| (i, init))
        }
        _ => None,
    })
}

fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::ExportDefault(e) => vec![e],
        StmtKind::VarDecl(decl) => decl.init.iter().collect(),
        StmtKind::Import(_) | StmtKind::Blank => Vec::new(),
    }
}

/// Arguments of the first `new <ctor>(...)` inside `expr`, searching
/// outside-in.
fn find_new<'e>(expr: &'e Expr, ctor: &str) -> Option<&'e Vec<Expr>> {
    if let ExprKind::New { callee, args } = &expr.kind {
        if matches!(&callee.kind, ExprKind::Ident(name) if name == ctor) {
            return Some(args);
        }
    }
    children(expr).into_iter().find_map(|c| find_new(c, ctor))
}

fn children(expr: &Expr) -> Vec<&Expr> {
    match &expr.kind {
        ExprKind::Member { object, .. } => vec![object],
        ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
            std::iter::once(&**callee).chain(args.iter()).collect()
        }
        ExprKind::Object { properties } => properties.iter().map(|p| &p.value).collect(),
        ExprKind::Array { elements } => elements.iter().collect(),
        ExprKind::Arrow { body, .. } => vec![body],
        ExprKind::Assign { target, value } => vec![target, value],
        _ => Vec::new(),
    }
}

/// Mutable access to the object-literal first argument of `new <ctor>(...)`
/// inside `stmt`.
fn object_in_new_mut<'m>(stmt: &'m mut Stmt, ctor: &str) -> Option<&'m mut Vec<Property>> {
    let expr = match &mut stmt.kind {
        StmtKind::Expr(e) | StmtKind::ExportDefault(e) => e,
        StmtKind::VarDecl(decl) => decl.init.as_mut()?,
        _ => return None,
    };
    let args = find_new_mut(expr, ctor)?;
    match &mut args.first_mut()?.kind {
        ExprKind::Object { properties } => Some(properties),
        _ => None,
    }
}

/// Mutable access to the object-literal initializer of a variable
/// declaration statement.
fn object_in_init_mut(stmt: &mut Stmt) -> Option<&mut Vec<Property>> {
    let StmtKind::VarDecl(decl) = &mut stmt.kind else {
        return None;
    };
    match &mut decl.init.as_mut()?.kind {
        ExprKind::Object { properties } => Some(properties),
        _ => None,
    }
}

fn find_new_mut<'e>(expr: &'e mut Expr, ctor: &str) -> Option<&'e mut Vec<Expr>> {
    if let ExprKind::New { callee, .. } = &expr.kind {
        if matches!(&callee.kind, ExprKind::Ident(name) if name == ctor) {
            match &mut expr.kind {
                ExprKind::New { args, .. } => return Some(args),
                _ => unreachable!(),
            }
        }
    }
    children_mut(expr).into_iter().find_map(|c| find_new_mut(c, ctor))
}

fn children_mut(expr: &mut Expr) -> Vec<&mut Expr> {
    match &mut expr.kind {
        ExprKind::Member { object, .. } => vec![object],
        ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
            std::iter::once(&mut **callee).chain(args.iter_mut()).collect()
        }
        ExprKind::Object { properties } => properties.iter_mut().map(|p| &mut p.value).collect(),
        ExprKind::Array { elements } => elements.iter_mut().collect(),
        ExprKind::Arrow { body, .. } => vec![body],
        ExprKind::Assign { target, value } => vec![target, value],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCategory, SourceContext};
    use crate::logger::Logger;
    use crate::runner::ErrorPolicy;
    use crate::syntax::parser::parse;
    use crate::syntax::printer::{print, FormatOptions};
    use crate::syntax::Module;

    fn module(src: &str) -> Module {
        parse(src, &SourceContext::from_file("test", src)).unwrap()
    }

    fn apply_with(
        edit: &AddConfigProperty,
        module: &mut Module,
        policy: ErrorPolicy,
    ) -> Result<(), GraftError> {
        let mut session = Session::new(
            module,
            SourceContext::fallback("test"),
            Logger::buffered(true).0,
            policy,
        );
        edit.apply(&mut session)
    }

    fn apply(edit: &AddConfigProperty, module: &mut Module) {
        apply_with(edit, module, ErrorPolicy::Continue).unwrap();
    }

    fn set_option(key: &str, value: &str) -> AddConfigProperty {
        AddConfigProperty {
            constructor: ConstructorRef::Ident("Vue".into()),
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    #[test]
    fn appends_to_inline_options_object() {
        let mut m = module("new Vue({ el: '#app' }).$mount();");
        apply(&set_option("router", "router"), &mut m);
        let out = print(&m, &FormatOptions::default());
        assert!(out.contains("el: '#app'"));
        assert!(out.contains("router: router"));
    }

    #[test]
    fn rerun_is_a_no_op() {
        let mut m = module("new Vue({});");
        let edit = set_option("router", "router");
        apply(&edit, &mut m);
        let first = print(&m, &FormatOptions::default());
        apply(&edit, &mut m);
        assert_eq!(print(&m, &FormatOptions::default()), first);
    }

    #[test]
    fn follows_identifier_to_declaration_initializer() {
        let mut m = module("const options = { el: '#app' };\nnew Vue(options);");
        apply(&set_option("store", "store"), &mut m);
        let out = print(&m, &FormatOptions::default());
        assert!(out.contains("store: store"));
        assert!(out.find("store: store").unwrap() < out.find("new Vue(options);").unwrap());
    }

    #[test]
    fn resolves_constructor_through_default_import() {
        let mut m = module("import App from 'vue';\nnew App({});");
        let mut edit = set_option("router", "router");
        edit.constructor = ConstructorRef::DefaultImportOf("vue".into());
        apply(&edit, &mut m);
        assert!(print(&m, &FormatOptions::default()).contains("router: router"));
    }

    #[test]
    fn missing_construction_is_a_structure_error() {
        let mut m = module("foo();");
        let err = apply_with(
            &set_option("router", "router"),
            &mut m,
            ErrorPolicy::Propagate,
        )
        .unwrap_err();
        assert_eq!(err.kind.category(), ErrorCategory::Structure);
    }

    #[test]
    fn uninitialized_declaration_is_a_structure_error() {
        let mut m = module("let options;\nnew Vue(options);");
        let err = apply_with(
            &set_option("router", "router"),
            &mut m,
            ErrorPolicy::Propagate,
        )
        .unwrap_err();
        assert_eq!(err.kind.category(), ErrorCategory::Structure);
    }

    #[test]
    fn comment_is_attached_to_the_property() {
        let mut m = module("new Vue({ el: '#app' });");
        let mut edit = set_option("router", "router");
        edit.comment = Some("Wire up routing.".into());
        apply(&edit, &mut m);
        let out = print(&m, &FormatOptions::default());
        assert!(out.contains("// Wire up routing."));
    }
}
