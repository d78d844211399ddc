//! Parsing and scope analysis of bundle sources.
//!
//! Every file is parsed into a fresh arena and analysed while the arena is alive. Callers receive
//! the program and its semantic model inside a closure and must return owned data, which keeps
//! the syntax tree lifetimes out of the rest of the engine.
//!
//! ```text
//! source text ──▶ oxc_parser ──▶ Program ──▶ SemanticBuilder ──▶ Semantic
//!                                   │                               │
//!                                   └──────── with_program(f) ◀─────┘
//! ```

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, IdentifierReference, Program};
use oxc_parser::{ParseOptions, Parser};
use oxc_semantic::{Scoping, Semantic, SemanticBuilder, SymbolId};
use oxc_span::{SourceType, Span};

use crate::error::{Error, Result};
use crate::module_id::ModuleId;

/// Parse `source` and run `f` over the program and its semantic model.
///
/// Bundles are scripts; `return` at the top level is tolerated since CommonJS wrappers allow it.
pub(crate) fn with_program<R>(
    path: &Path,
    source: &str,
    f: impl for<'a> FnOnce(&'a Program<'a>, &Semantic<'a>) -> Result<R>,
) -> Result<R> {
    let allocator = Allocator::default();
    let options = ParseOptions {
        preserve_parens: false,
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };
    let ret = Parser::new(&allocator, source, SourceType::cjs())
        .with_options(options)
        .parse();

    if let Some(first) = ret.errors.first() {
        return Err(Error::parse(path, first.to_string()));
    }

    let program = allocator.alloc(ret.program);
    let semantic = SemanticBuilder::new().build(program).semantic;
    tracing::trace!(
        path = %path.display(),
        symbols = semantic.scoping().symbols_len(),
        "analysed source"
    );

    f(program, &semantic)
}

/// Module or chunk id written as a numeric or string literal.
pub(crate) fn literal_id(expr: &Expression<'_>) -> Option<ModuleId> {
    match expr.without_parentheses() {
        Expression::NumericLiteral(lit) => ModuleId::from_number(lit.value).ok(),
        Expression::StringLiteral(lit) => Some(ModuleId::from_key(lit.value.as_str())),
        _ => None,
    }
}

/// The symbol an identifier use resolves to, if it is bound in the program.
pub(crate) fn resolved_symbol(scoping: &Scoping, ident: &IdentifierReference<'_>) -> Option<SymbolId> {
    ident
        .reference_id
        .get()
        .and_then(|id| scoping.get_reference(id).symbol_id())
}

/// Whether `expr` is an identifier resolving to `symbol`.
pub(crate) fn refers_to(scoping: &Scoping, expr: &Expression<'_>, symbol: SymbolId) -> bool {
    match expr.without_parentheses() {
        Expression::Identifier(ident) => resolved_symbol(scoping, ident) == Some(symbol),
        _ => false,
    }
}

/// Byte range of `span` relative to `origin`.
pub(crate) fn relative(span: Span, origin: u32) -> std::ops::Range<usize> {
    (span.start - origin) as usize..(span.end - origin) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_name_the_file() {
        let err = with_program(Path::new("broken.js"), "function (", |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Parse { ref path, .. } if path == Path::new("broken.js")));
    }

    #[test]
    fn top_level_return_is_accepted() {
        let statements =
            with_program(Path::new("a.js"), "return 1;", |program, _| Ok(program.body.len()))
                .unwrap();
        assert_eq!(statements, 1);
    }

    #[test]
    fn relative_ranges() {
        assert_eq!(relative(Span::new(10, 14), 8), 2..6);
    }
}
