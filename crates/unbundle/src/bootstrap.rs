//! Locating the bundle bootstrap.
//!
//! The bootstrap is the immediately invoked function that receives the module table and
//! defines the require function. It is found by shape: a single-parameter function with a
//! block body whose body contains `<table>[id].call(a, b, c, d)`. Functions are visited in
//! source order and the first match wins, so an outer bootstrap shadows any nested lookalikes.
//!
//! Browserify output is recognised by its prelude call instead:
//! `prelude({id: [function(require, module, exports) {..}, {request: id}]}, {}, [entry])`.

use std::path::Path;

use oxc_ast::AstKind;
use oxc_ast::ast::{
    Argument, ArrayExpressionElement, AssignmentExpression, AssignmentTarget, CallExpression,
    Expression, FormalParameters, FunctionBody, ObjectPropertyKind,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::{NodeId, Semantic};
use oxc_span::{GetSpan, Span};

use crate::error::{Error, Result};
use crate::metadata::BundleMetadata;
use crate::module_id::ModuleId;
use crate::roles::{CallArg, ClosureRoles, InvocationSite};
use crate::syntax::literal_id;

/// Which bundler produced the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Webpack,
    Browserify,
}

/// Facts read from the bootstrap function.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub kind: BundleKind,
    /// Span of the bootstrap function.
    pub span: Span,
    /// Closure call site. Browserify closures have a fixed layout and no site is read.
    pub invocation: Option<InvocationSite>,
    pub roles: ClosureRoles,
    /// String assigned to `<require>.p`, the public path lazy chunks are served from.
    pub public_path: Option<String>,
    /// Entry module named by `<require>.s = id` or a direct `<require>(id)`.
    pub entry: Option<ModuleId>,
}

/// A located bootstrap together with the module table expression it is invoked with.
pub(crate) struct Located<'a> {
    pub bootstrap: Bootstrap,
    pub table: &'a Expression<'a>,
}

/// Find the bootstrap in a parsed bundle.
///
/// With `offset`, only the function starting at that byte offset is considered and the
/// single-parameter shape check is skipped.
pub(crate) fn locate<'a>(
    semantic: &Semantic<'a>,
    offset: Option<u32>,
    path: &Path,
) -> Result<Located<'a>> {
    let nodes = semantic.nodes();

    for node in nodes.iter() {
        if offset.is_none() {
            if let AstKind::CallExpression(call) = node.kind() {
                if let Some(located) = browserify_prelude(call) {
                    tracing::debug!(
                        start = located.bootstrap.span.start,
                        entry = ?located.bootstrap.entry.as_ref().map(ToString::to_string),
                        "located browserify prelude"
                    );
                    return Ok(located);
                }
            }
        }

        let Some((span, params, body)) = function_parts(node.kind()) else {
            continue;
        };
        let candidate = match offset {
            Some(offset) => span.start == offset,
            None => params.items.len() == 1 && params.rest.is_none(),
        };
        if !candidate {
            continue;
        }

        let mut scan = BootstrapScan::default();
        scan.visit_function_body(body);
        let Some(invocation) = scan.invocation.take() else {
            if offset.is_some() {
                return Err(Error::module_table(
                    path,
                    "the function at `bootstrapOffset` never invokes a module closure",
                ));
            }
            continue;
        };

        let roles = ClosureRoles::resolve(&invocation)?;
        let table = module_table(semantic, node.id(), span, path)?;
        let require = require_function(semantic, span, &roles.require_name);
        let bootstrap = scan.finish(span, invocation, roles, require);
        tracing::debug!(
            start = span.start,
            require = %bootstrap.roles.require_name,
            public_path = ?bootstrap.public_path,
            entry = ?bootstrap.entry.as_ref().map(ToString::to_string),
            "located bootstrap"
        );
        return Ok(Located { bootstrap, table });
    }

    Err(Error::BootstrapNotFound {
        path: path.to_path_buf(),
        metadata: BundleMetadata::path_for(path),
    })
}

fn browserify_prelude<'a>(call: &'a CallExpression<'a>) -> Option<Located<'a>> {
    if call.arguments.len() != 3 {
        return None;
    }
    let table = call.arguments[0].as_expression()?;
    let Expression::ObjectExpression(object) = table.without_parentheses() else {
        return None;
    };
    if object.properties.is_empty() || !object.properties.iter().all(is_closure_pair) {
        return None;
    }
    let cache = call.arguments[1].as_expression().map(Expression::without_parentheses);
    if !matches!(cache, Some(Expression::ObjectExpression(_))) {
        return None;
    }
    let Some(Expression::ArrayExpression(entries)) =
        call.arguments[2].as_expression().map(Expression::without_parentheses)
    else {
        return None;
    };

    let entry = entries
        .elements
        .iter()
        .filter_map(ArrayExpressionElement::as_expression)
        .find_map(literal_id);
    let bootstrap = Bootstrap {
        kind: BundleKind::Browserify,
        span: call.callee.span(),
        invocation: None,
        roles: ClosureRoles::commonjs(),
        public_path: None,
        entry,
    };
    Some(Located { bootstrap, table })
}

/// `id: [function (..) {..}, ..]`
fn is_closure_pair(property: &ObjectPropertyKind<'_>) -> bool {
    let ObjectPropertyKind::ObjectProperty(property) = property else {
        return false;
    };
    let Expression::ArrayExpression(pair) = property.value.without_parentheses() else {
        return false;
    };
    let first = pair
        .elements
        .first()
        .and_then(ArrayExpressionElement::as_expression)
        .map(Expression::without_parentheses);
    matches!(
        first,
        Some(Expression::FunctionExpression(_) | Expression::ArrowFunctionExpression(_))
    )
}

/// Span of the require function defined inside the bootstrap.
fn require_function(semantic: &Semantic<'_>, bootstrap: Span, name: &str) -> Option<Span> {
    semantic.nodes().iter().find_map(|node| {
        let span = match node.kind() {
            AstKind::Function(function) => function
                .id
                .as_ref()
                .filter(|id| id.name.as_str() == name)
                .map(|_| function.span),
            AstKind::VariableDeclarator(declarator) => declarator
                .id
                .get_binding_identifier()
                .filter(|id| id.name.as_str() == name)
                .and_then(|_| declarator.init.as_ref())
                .map(GetSpan::span),
            _ => None,
        }?;
        let inside = bootstrap.start <= span.start && span.end <= bootstrap.end;
        (inside && span != bootstrap).then_some(span)
    })
}

fn function_parts<'a>(
    kind: AstKind<'a>,
) -> Option<(Span, &'a FormalParameters<'a>, &'a FunctionBody<'a>)> {
    match kind {
        AstKind::Function(function) => function
            .body
            .as_deref()
            .map(|body| (function.span, &*function.params, body)),
        AstKind::ArrowFunctionExpression(arrow) if !arrow.expression => {
            Some((arrow.span, &*arrow.params, &*arrow.body))
        }
        _ => None,
    }
}

/// The first argument of the call that immediately invokes the bootstrap.
fn module_table<'a>(
    semantic: &Semantic<'a>,
    function: NodeId,
    span: Span,
    path: &Path,
) -> Result<&'a Expression<'a>> {
    let AstKind::CallExpression(call) = semantic.nodes().parent_kind(function) else {
        return Err(Error::module_table(path, "the bootstrap is not immediately invoked"));
    };
    if call.callee.without_parentheses().span() != span {
        return Err(Error::module_table(
            path,
            "the bootstrap is passed as an argument instead of being invoked",
        ));
    }

    call.arguments
        .first()
        .and_then(Argument::as_expression)
        .ok_or_else(|| Error::module_table(path, "the bootstrap is invoked without a module table"))
}

fn invocation_site(call: &CallExpression<'_>) -> Option<InvocationSite> {
    let Expression::StaticMemberExpression(callee) = call.callee.without_parentheses() else {
        return None;
    };
    let indexed = matches!(
        callee.object.without_parentheses(),
        Expression::ComputedMemberExpression(_) | Expression::StaticMemberExpression(_)
    );
    if callee.property.name != "call" || !indexed || call.arguments.len() != 4 {
        return None;
    }

    let mut args = call
        .arguments
        .iter()
        .map(|arg| arg.as_expression().map_or(CallArg::Other, call_arg));
    let this_arg = args.next()?;
    Some(InvocationSite {
        this_arg,
        args: args.collect(),
    })
}

fn call_arg(expr: &Expression<'_>) -> CallArg {
    match expr.without_parentheses() {
        Expression::Identifier(ident) => CallArg::Identifier(ident.name.to_string()),
        Expression::StaticMemberExpression(member) => match member.object.without_parentheses() {
            Expression::Identifier(object) => CallArg::Member {
                object: object.name.to_string(),
                property: member.property.name.to_string(),
            },
            _ => CallArg::Other,
        },
        _ => CallArg::Other,
    }
}

/// Collects the invocation site plus public path and entry candidates keyed by object name.
///
/// Candidates are filtered by the require name once roles are known.
#[derive(Default)]
struct BootstrapScan {
    invocation: Option<InvocationSite>,
    public_paths: Vec<(String, String)>,
    entry_assignments: Vec<(String, ModuleId)>,
    entry_calls: Vec<(String, ModuleId, Span)>,
}

impl BootstrapScan {
    /// Calls made from inside the require function itself are never the entry.
    fn finish(
        self,
        span: Span,
        invocation: InvocationSite,
        roles: ClosureRoles,
        require_function: Option<Span>,
    ) -> Bootstrap {
        let require = roles.require_name.as_str();
        let public_path = self
            .public_paths
            .into_iter()
            .find(|(object, _)| object == require)
            .map(|(_, value)| value);
        let outside = |call: &Span| {
            require_function.is_none_or(|inner| call.start < inner.start || call.end > inner.end)
        };
        let calls = self
            .entry_calls
            .into_iter()
            .filter(|(_, _, call)| outside(call))
            .map(|(object, id, _)| (object, id));
        let entry = self
            .entry_assignments
            .into_iter()
            .chain(calls)
            .find(|(object, _)| object == require)
            .map(|(_, id)| id);

        Bootstrap {
            kind: BundleKind::Webpack,
            span,
            invocation: Some(invocation),
            roles,
            public_path,
            entry,
        }
    }
}

impl<'a> Visit<'a> for BootstrapScan {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if self.invocation.is_none() {
            self.invocation = invocation_site(it);
        }

        if let Expression::Identifier(callee) = it.callee.without_parentheses() {
            if it.arguments.len() == 1 {
                if let Some(id) = it.arguments[0].as_expression().and_then(literal_id) {
                    self.entry_calls.push((callee.name.to_string(), id, it.span));
                }
            }
        }

        walk::walk_call_expression(self, it);
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        let target = match &it.left {
            AssignmentTarget::StaticMemberExpression(member) => {
                match member.object.without_parentheses() {
                    Expression::Identifier(object) => Some((object, member)),
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some((object, member)) = target {
            let object = object.name.to_string();
            match member.property.name.as_str() {
                "p" => {
                    if let Expression::StringLiteral(lit) = it.right.without_parentheses() {
                        self.public_paths.push((object, lit.value.to_string()));
                    }
                }
                "s" => {
                    if let Some(id) = literal_id(&it.right) {
                        self.entry_assignments.push((object, id));
                    }
                }
                _ => {}
            }
        }

        walk::walk_assignment_expression(self, it);
    }
}
