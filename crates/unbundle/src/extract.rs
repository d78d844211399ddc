//! Dependency and rename-site extraction from one module closure.
//!
//! Everything is driven by symbol references: the closure's role parameters are bound symbols,
//! and each resolved reference is classified by the shape of its enclosing expressions. Uses
//! of `require` that match no known shape (`require(name)`, `require.n(x)`, passing `require`
//! around) are left untouched.

use std::ops::Range;

use indexmap::IndexMap;
use oxc_ast::AstKind;
use oxc_ast::ast::{Argument, Expression, IdentifierReference};
use oxc_semantic::{NodeId, Semantic, SymbolId};
use oxc_span::{GetSpan, Span};

use crate::error::{Error, Result};
use crate::module::{DependencyEdge, DependencyKind, RenameKind, RenameSite};
use crate::module_id::ModuleId;
use crate::roles::{ClosureRoles, Role};
use crate::syntax::{literal_id, refers_to, relative};
use crate::table::Closure;

#[derive(Debug)]
pub(crate) struct Extracted {
    pub edges: Vec<DependencyEdge>,
    pub renames: Vec<RenameSite>,
    /// Range of the body statements relative to the closure start.
    pub body: Range<usize>,
}

/// Extract the dependency edges and rename sites of one closure.
pub(crate) fn extract(
    module: &ModuleId,
    closure: Closure<'_>,
    semantic: &Semantic<'_>,
    roles: &ClosureRoles,
    lookup: &IndexMap<String, ModuleId>,
) -> Result<Extracted> {
    let origin = closure.span.start;
    let scoping = semantic.scoping();
    let nodes = semantic.nodes();

    let mut edges = Vec::new();
    let mut renames = Vec::new();

    for role in Role::ALL {
        let Some(binding) = closure
            .params
            .items
            .get(roles.position(role))
            .and_then(|param| param.pattern.get_binding_identifier())
        else {
            continue;
        };
        let Some(symbol) = binding.symbol_id.get() else {
            continue;
        };

        renames.push(RenameSite {
            range: relative(binding.span, origin),
            kind: RenameKind::Param(role),
        });

        for reference in scoping.get_resolved_reference_ids(symbol) {
            let node = scoping.get_reference(*reference).node_id();
            let AstKind::IdentifierReference(ident) = nodes.kind(node) else {
                continue;
            };

            let shorthand = match nodes.parent_kind(node) {
                AstKind::ObjectProperty(property) => property.shorthand,
                AstKind::AssignmentTargetPropertyIdentifier(_) => true,
                _ => false,
            };
            renames.push(RenameSite {
                range: relative(ident.span, origin),
                kind: if shorthand {
                    RenameKind::Shorthand(role)
                } else {
                    RenameKind::Param(role)
                },
            });

            match role {
                Role::Require => {
                    let use_site = RequireUse {
                        semantic,
                        symbol,
                        node,
                        ident,
                        lookup,
                        origin,
                    };
                    if let Some(edge) = use_site.classify(module)? {
                        edges.push(edge);
                    }
                }
                Role::Module if roles.exports_key != "exports" => {
                    if let AstKind::StaticMemberExpression(member) = nodes.parent_kind(node) {
                        if member.object.span() == ident.span
                            && member.property.name == roles.exports_key.as_str()
                        {
                            renames.push(RenameSite {
                                range: relative(member.property.span, origin),
                                kind: RenameKind::ExportsKey,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }

    renames.sort_by_key(|site| site.range.start);

    if !edges.is_empty() {
        let targets: Vec<String> = edges
            .iter()
            .filter_map(|edge| edge.module.as_ref().map(ToString::to_string))
            .collect();
        tracing::debug!(module = %module, depends_on = ?targets, "extracted dependencies");
    }

    Ok(Extracted {
        edges,
        renames,
        body: body_range(closure, origin),
    })
}

/// Statements (and directives) of the closure body, without the braces.
fn body_range(closure: Closure<'_>, origin: u32) -> Range<usize> {
    let body = closure.body;
    let start = body
        .directives
        .first()
        .map(|directive| directive.span.start)
        .or_else(|| body.statements.first().map(|stmt| stmt.span().start));
    let end = body
        .statements
        .last()
        .map(|stmt| stmt.span().end)
        .or_else(|| body.directives.last().map(|directive| directive.span.end));

    match (start, end) {
        (Some(start), Some(end)) => relative(Span::new(start, end), origin),
        _ => {
            let inner = relative(body.span, origin);
            let empty = (inner.start + 1).min(inner.end);
            empty..empty
        }
    }
}

/// One reference to the require parameter.
struct RequireUse<'s, 'a> {
    semantic: &'s Semantic<'a>,
    symbol: SymbolId,
    node: NodeId,
    ident: &'a IdentifierReference<'a>,
    lookup: &'s IndexMap<String, ModuleId>,
    origin: u32,
}

impl<'a> RequireUse<'_, 'a> {
    fn classify(&self, module: &ModuleId) -> Result<Option<DependencyEdge>> {
        let nodes = self.semantic.nodes();
        let parent = nodes.parent_id(self.node);

        match nodes.kind(parent) {
            // require(id)
            AstKind::CallExpression(call) if call.callee.span() == self.ident.span => {
                if call.arguments.len() > 1 {
                    return Err(Error::TooManyArguments {
                        module: module.clone(),
                        count: call.arguments.len(),
                    });
                }
                Ok(call
                    .arguments
                    .first()
                    .and_then(|arg| self.target(arg))
                    .map(|(id, request, literal)| DependencyEdge {
                        kind: DependencyKind::Direct,
                        chunk: None,
                        module: Some(id),
                        request,
                        literal: Some(literal),
                    }))
            }
            AstKind::StaticMemberExpression(member) if member.object.span() == self.ident.span => {
                match member.property.name.as_str() {
                    "e" => Ok(self.chunk_load(parent, member.span)),
                    "t" => Ok(self.interop(parent, member.span)),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// `require.e(chunk)` with an optional `.then(require.bind(null, id))`.
    fn chunk_load(&self, member: NodeId, member_span: Span) -> Option<DependencyEdge> {
        let nodes = self.semantic.nodes();
        let call_id = nodes.parent_id(member);
        let AstKind::CallExpression(call) = nodes.kind(call_id) else {
            return None;
        };
        if call.callee.span() != member_span {
            return None;
        }
        let chunk = call
            .arguments
            .first()
            .and_then(Argument::as_expression)
            .and_then(literal_id)?;

        let then = self.bound_then(call_id, call.span);
        let (module, request, literal) = match then {
            Some((id, request, literal)) => (Some(id), request, Some(literal)),
            None => (None, None, None),
        };

        Some(DependencyEdge {
            kind: DependencyKind::Chunk,
            chunk: Some(chunk),
            module,
            request,
            literal,
        })
    }

    /// The module id in `<chunk load>.then(require.bind(null, id))`.
    fn bound_then(&self, call: NodeId, call_span: Span) -> Option<(ModuleId, Option<String>, Range<usize>)> {
        let nodes = self.semantic.nodes();
        let then_id = nodes.parent_id(call);
        let AstKind::StaticMemberExpression(then) = nodes.kind(then_id) else {
            return None;
        };
        if then.property.name != "then" || then.object.span() != call_span {
            return None;
        }
        let AstKind::CallExpression(then_call) = nodes.parent_kind(then_id) else {
            return None;
        };
        if then_call.callee.span() != then.span {
            return None;
        }

        let Some(Expression::CallExpression(bind)) =
            then_call.arguments.first().and_then(Argument::as_expression)
        else {
            return None;
        };
        let Expression::StaticMemberExpression(callee) = bind.callee.without_parentheses() else {
            return None;
        };
        if callee.property.name != "bind"
            || !refers_to(self.semantic.scoping(), &callee.object, self.symbol)
            || bind.arguments.len() != 2
        {
            return None;
        }
        self.target(&bind.arguments[1])
    }

    /// `require.t.bind(null, id)`
    fn interop(&self, member: NodeId, member_span: Span) -> Option<DependencyEdge> {
        let nodes = self.semantic.nodes();
        let bind_id = nodes.parent_id(member);
        let AstKind::StaticMemberExpression(bind) = nodes.kind(bind_id) else {
            return None;
        };
        if bind.property.name != "bind" || bind.object.span() != member_span {
            return None;
        }
        let AstKind::CallExpression(call) = nodes.parent_kind(bind_id) else {
            return None;
        };
        if call.callee.span() != bind.span || call.arguments.len() < 2 {
            return None;
        }

        let (id, request, literal) = self.target(&call.arguments[1])?;
        Some(DependencyEdge {
            kind: DependencyKind::Interop,
            chunk: None,
            module: Some(id),
            request,
            literal: Some(literal),
        })
    }

    /// Module id named by a literal argument, resolving require strings through the lookup.
    fn target(&self, arg: &Argument<'_>) -> Option<(ModuleId, Option<String>, Range<usize>)> {
        let expr = arg.as_expression()?.without_parentheses();
        let literal = relative(expr.span(), self.origin);
        match expr {
            Expression::StringLiteral(lit) => {
                let request = lit.value.as_str();
                let id = self
                    .lookup
                    .get(request)
                    .cloned()
                    .unwrap_or_else(|| ModuleId::from_key(request));
                Some((id, Some(request.to_string()), literal))
            }
            other => literal_id(other).map(|id| (id, None, literal)),
        }
    }
}
