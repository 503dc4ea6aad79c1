//! Registration-call insertion: `Receiver.method(Argument, ...)` statements.
//!
//! Typical shape is a framework install call such as `Vue.use(Router)`.
//! Presence is keyed on the (receiver, method, first argument) triple, so
//! re-registering the same argument is a reported no-op while registering a
//! different argument appends a sibling call.

use serde::{Deserialize, Serialize};

use crate::edit::comments::create_comments;
use crate::edit::{insert_after_imports_or_at_start, last_index_where};
use crate::errors::GraftError;
use crate::runner::{Session, Transform};
use crate::syntax::{parser, Expr, ExprKind, Span, Stmt, StmtKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRegistrationCall {
    pub receiver: String,
    pub method: String,
    /// The identifier being registered; the call's first argument.
    pub argument: String,
    /// Further arguments as raw expression code, appended in order.
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Transform for AddRegistrationCall {
    fn name(&self) -> &'static str {
        "add-registration-call"
    }

    fn apply(&self, session: &mut Session) -> Result<(), GraftError> {
        session.title(&format!(
            "Register '{}' via {}.{}().",
            self.argument, self.receiver, self.method
        ));

        if self.already_registered(session) {
            session.warning(&format!(
                "'{}' is already registered with {}.{}() and will be (safely) ignored.",
                self.argument, self.receiver, self.method
            ));
            return Ok(());
        }

        let mut args = vec![Expr::ident(&self.argument)];
        for code in &self.extra_args {
            match parser::parse_expression(code, "registration argument") {
                Ok(expr) => args.push(expr),
                Err(error) => return session.recoverable(error),
            }
        }

        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(
                    ExprKind::Member {
                        object: Box::new(Expr::ident(&self.receiver)),
                        property: self.method.clone(),
                    },
                    Span::default(),
                )),
                args,
            },
            Span::default(),
        );
        let mut stmt = Stmt::new(StmtKind::Expr(call), Span::default());
        if let Some(comment) = &self.comment {
            stmt.comments = create_comments(comment, true, true);
        }

        // Group with existing registrations when there are any.
        match last_index_where(&session.module.body, |s| self.is_registration_call(s)) {
            Some(index) => session.module.body.insert(index + 1, stmt),
            None => insert_after_imports_or_at_start(session.module, stmt),
        }
        Ok(())
    }
}

impl AddRegistrationCall {
    /// Any `receiver.method(...)` call statement, regardless of argument.
    fn is_registration_call(&self, stmt: &Stmt) -> bool {
        self.call_first_argument(stmt).is_some()
    }

    fn already_registered(&self, session: &Session) -> bool {
        session.module.body.iter().any(|stmt| {
            self.call_first_argument(stmt)
                .map(|arg| matches!(&arg.kind, ExprKind::Ident(name) if *name == self.argument))
                .unwrap_or(false)
        })
    }

    /// First argument of a top-level `receiver.method(...)` call, when the
    /// statement is one.
    fn call_first_argument<'m>(&self, stmt: &'m Stmt) -> Option<&'m Expr> {
        let StmtKind::Expr(expr) = &stmt.kind else {
            return None;
        };
        let ExprKind::Call { callee, args } = &expr.kind else {
            return None;
        };
        let ExprKind::Member { object, property } = &callee.kind else {
            return None;
        };
        if *property != self.method {
            return None;
        }
        match &object.kind {
            ExprKind::Ident(name) if *name == self.receiver => args.first(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceContext;
    use crate::logger::Logger;
    use crate::runner::ErrorPolicy;
    use crate::syntax::parser::parse;
    use crate::syntax::printer::{print, FormatOptions};
    use crate::syntax::Module;

    fn module(src: &str) -> Module {
        parse(src, &SourceContext::from_file("test", src)).unwrap()
    }

    fn apply(call: &AddRegistrationCall, module: &mut Module) {
        let mut session = Session::new(
            module,
            SourceContext::fallback("test"),
            Logger::buffered(true).0,
            ErrorPolicy::Continue,
        );
        call.apply(&mut session).unwrap();
    }

    fn register(argument: &str) -> AddRegistrationCall {
        AddRegistrationCall {
            receiver: "Vue".into(),
            method: "use".into(),
            argument: argument.into(),
            extra_args: Vec::new(),
            comment: None,
        }
    }

    #[test]
    fn inserts_after_imports() {
        let mut m = module("import Vue from 'vue';\nimport Router from 'vue-router';\nfoo();");
        apply(&register("Router"), &mut m);
        let out = print(&m, &FormatOptions::default());
        assert!(out.find("vue-router").unwrap() < out.find("Vue.use(Router);").unwrap());
        assert!(out.find("Vue.use(Router);").unwrap() < out.find("foo();").unwrap());
    }

    #[test]
    fn rerun_is_a_no_op() {
        let mut m = module("import Vue from 'vue';");
        apply(&register("Router"), &mut m);
        let first = print(&m, &FormatOptions::default());
        apply(&register("Router"), &mut m);
        assert_eq!(print(&m, &FormatOptions::default()), first);
    }

    #[test]
    fn groups_with_existing_registrations() {
        let mut m = module("import Vue from 'vue';\nVue.use(Router);\nfoo();");
        apply(&register("Vuex"), &mut m);
        let out = print(&m, &FormatOptions::default());
        assert!(out.find("Vue.use(Router);").unwrap() < out.find("Vue.use(Vuex);").unwrap());
        assert!(out.find("Vue.use(Vuex);").unwrap() < out.find("foo();").unwrap());
    }

    #[test]
    fn extra_arguments_are_appended() {
        let mut m = module("");
        let mut call = register("Plugin");
        call.extra_args = vec!["{ debug: true }".into()];
        apply(&call, &mut m);
        assert!(print(&m, &FormatOptions::default()).contains("Vue.use(Plugin, { debug: true });"));
    }

    #[test]
    fn comment_is_attached() {
        let mut m = module("");
        let mut call = register("Router");
        call.comment = Some("Install the router.".into());
        apply(&call, &mut m);
        assert!(print(&m, &FormatOptions::default())
            .contains("// Install the router.\nVue.use(Router);"));
    }

    #[test]
    fn malformed_extra_argument_leaves_tree_untouched() {
        let mut m = module("a();");
        let mut call = register("Plugin");
        call.extra_args = vec!["{ not valid".into()];
        apply(&call, &mut m);
        assert!(!print(&m, &FormatOptions::default()).contains("Vue.use"));
    }
}
