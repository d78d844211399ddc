//! Reading module tables.
//!
//! A module table is either an array literal (the index is the module id) or an object literal
//! (the key is the module id). Each entry is a module closure, or a `[closure, {request: id}]`
//! pair carrying a lookup of require strings. `null` entries and holes are placeholders for
//! modules defined in another chunk.

use std::path::Path;

use indexmap::IndexMap;
use oxc_ast::AstKind;
use oxc_ast::ast::{
    ArrayExpressionElement, Expression, FormalParameters, FunctionBody, ObjectPropertyKind,
    PropertyKey,
};
use oxc_semantic::Semantic;
use oxc_span::{GetSpan, Span};

use crate::error::{Error, Result};
use crate::module_id::{ChunkId, ModuleId};
use crate::syntax::literal_id;

/// A module closure as it appears in the table.
#[derive(Clone, Copy)]
pub(crate) struct Closure<'a> {
    pub span: Span,
    pub params: &'a FormalParameters<'a>,
    pub body: &'a FunctionBody<'a>,
}

pub(crate) struct TableEntry<'a> {
    pub id: ModuleId,
    pub closure: Closure<'a>,
    /// Require string → module id, from `[closure, {lookup}]` entries.
    pub lookup: IndexMap<String, ModuleId>,
}

/// Read every module entry of a table expression, in source order.
pub(crate) fn read_table<'a>(table: &'a Expression<'a>, path: &Path) -> Result<Vec<TableEntry<'a>>> {
    let mut entries = Vec::new();

    match table.without_parentheses() {
        Expression::ArrayExpression(array) => {
            for (index, element) in array.elements.iter().enumerate() {
                let expr = match element {
                    ArrayExpressionElement::Elision(_) => continue,
                    ArrayExpressionElement::SpreadElement(spread) => {
                        return Err(Error::module_table(
                            path,
                            format!("spread element at offset {}", spread.span.start),
                        ));
                    }
                    other => match other.as_expression() {
                        Some(expr) => expr,
                        None => continue,
                    },
                };
                push_entry(&mut entries, ModuleId::Index(index as u64), expr);
            }
        }
        Expression::ObjectExpression(object) => {
            for property in &object.properties {
                let ObjectPropertyKind::ObjectProperty(property) = property else {
                    tracing::warn!(path = %path.display(), "skipping spread in module table");
                    continue;
                };
                let Some(id) = key_id(&property.key) else {
                    tracing::warn!(
                        path = %path.display(),
                        offset = property.span.start,
                        "skipping module table entry with a computed key"
                    );
                    continue;
                };
                push_entry(&mut entries, id, &property.value);
            }
        }
        other => {
            return Err(Error::module_table(
                path,
                format!(
                    "expected an array or object literal of module closures at offset {}",
                    other.span().start
                ),
            ));
        }
    }

    Ok(entries)
}

fn key_id(key: &PropertyKey<'_>) -> Option<ModuleId> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ModuleId::from_key(ident.name.as_str())),
        other => other.as_expression().and_then(literal_id),
    }
}

fn push_entry<'a>(entries: &mut Vec<TableEntry<'a>>, id: ModuleId, expr: &'a Expression<'a>) {
    let expr = expr.without_parentheses();
    if expr.is_null() {
        return;
    }

    if let Some(closure) = closure(expr) {
        entries.push(TableEntry {
            id,
            closure,
            lookup: IndexMap::new(),
        });
        return;
    }

    if let Expression::ArrayExpression(pair) = expr {
        let mut elements = pair.elements.iter().map(ArrayExpressionElement::as_expression);
        if let (Some(Some(first)), Some(Some(Expression::ObjectExpression(lookup)))) =
            (elements.next(), elements.next())
        {
            if let Some(closure) = closure(first.without_parentheses()) {
                let lookup = lookup
                    .properties
                    .iter()
                    .filter_map(|property| match property {
                        ObjectPropertyKind::ObjectProperty(property) => {
                            let request = match &property.key {
                                PropertyKey::StaticIdentifier(ident) => ident.name.to_string(),
                                PropertyKey::StringLiteral(lit) => lit.value.to_string(),
                                _ => return None,
                            };
                            literal_id(&property.value).map(|target| (request, target))
                        }
                        ObjectPropertyKind::SpreadProperty(_) => None,
                    })
                    .collect();
                entries.push(TableEntry {
                    id,
                    closure,
                    lookup,
                });
                return;
            }
        }
    }

    tracing::warn!(module = %id, offset = expr.span().start, "module table entry is not a closure");
}

fn closure<'a>(expr: &'a Expression<'a>) -> Option<Closure<'a>> {
    match expr {
        Expression::FunctionExpression(function) => function.body.as_deref().map(|body| Closure {
            span: function.span,
            params: &function.params,
            body,
        }),
        Expression::ArrowFunctionExpression(arrow) => Some(Closure {
            span: arrow.span,
            params: &arrow.params,
            body: &arrow.body,
        }),
        _ => None,
    }
}

/// Find the chunk ids and module table in a lazily loaded chunk file.
///
/// Chunk files register themselves with `jsonp([ids], modules)` or `push([[ids], modules])`: the
/// first non-empty array of literals followed (as argument or element) by an array or object
/// literal is taken as the chunk id list, and what follows it as the module table.
pub(crate) fn chunk_module_list<'a>(
    semantic: &Semantic<'a>,
    path: &Path,
) -> Result<(Vec<ChunkId>, &'a Expression<'a>)> {
    let nodes = semantic.nodes();

    for node in nodes.iter() {
        let AstKind::ArrayExpression(array) = node.kind() else {
            continue;
        };
        let ids: Option<Vec<ChunkId>> = array
            .elements
            .iter()
            .map(|element| element.as_expression().and_then(literal_id))
            .collect();
        let Some(ids) = ids.filter(|ids| !ids.is_empty()) else {
            continue;
        };

        let siblings: Vec<Option<&'a Expression<'a>>> = match nodes.parent_kind(node.id()) {
            AstKind::CallExpression(call) => call.arguments.iter().map(|a| a.as_expression()).collect(),
            AstKind::ArrayExpression(parent) => parent
                .elements
                .iter()
                .map(ArrayExpressionElement::as_expression)
                .collect(),
            _ => continue,
        };

        let first_is_ids = siblings
            .first()
            .copied()
            .flatten()
            .is_some_and(|first| first.span() == array.span);
        let table = siblings.get(1).copied().flatten().filter(|table| {
            matches!(
                table.without_parentheses(),
                Expression::ArrayExpression(_) | Expression::ObjectExpression(_)
            )
        });

        if let (true, Some(table)) = (first_is_ids, table) {
            return Ok((ids, table));
        }
    }

    Err(Error::ChunkModuleList {
        path: path.to_path_buf(),
    })
}
