//! Rendering a module back to source text.
//!
//! Rendering works on an owned copy of the closure text: dependency literals become relative
//! require paths, role parameters get their CommonJS names, and the closure wrapper is dropped.
//! A module can be rendered any number of times with identical output.

use std::ops::Range;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::diagnostic::Diagnostic;
use crate::module::{Module, RenameKind};
use crate::module_id::ModuleId;
use crate::options::Options;

/// Rendering switches taken from [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub keep_closure: bool,
    pub rename_variables: bool,
}

impl From<&Options> for RenderOptions {
    fn from(options: &Options) -> Self {
        Self {
            keep_closure: options.keep_closure,
            rename_variables: options.rename_variables,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            keep_closure: false,
            rename_variables: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render `module` given the output path (without extension) of every module.
pub fn render(
    module: &Module,
    paths: &IndexMap<ModuleId, String>,
    options: RenderOptions,
) -> Rendered {
    let own_path = paths.get(&module.id).cloned().unwrap_or_else(|| module.path());
    let mut diagnostics = Vec::new();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for edge in &module.edges {
        let (Some(target), Some(literal)) = (&edge.module, &edge.literal) else {
            continue;
        };
        match paths.get(target) {
            Some(target_path) => {
                let request = require_path(&own_path, target_path);
                edits.push((literal.clone(), quote(&request)));
            }
            None => diagnostics.push(Diagnostic::warn(
                &module.id,
                format!("require of module {target} left unchanged: no chunk defines it"),
            )),
        }
    }

    if options.rename_variables {
        for site in &module.renames {
            let original = &module.source[site.range.clone()];
            let replacement = match site.kind {
                RenameKind::Param(role) => role.canonical_name().to_string(),
                RenameKind::Shorthand(role) if original != role.canonical_name() => {
                    format!("{original}: {}", role.canonical_name())
                }
                RenameKind::Shorthand(_) => continue,
                RenameKind::ExportsKey => "exports".to_string(),
            };
            if replacement != original {
                edits.push((site.range.clone(), replacement));
            }
        }
    }

    let window = if options.keep_closure {
        0..module.source.len()
    } else {
        module.body.clone()
    };
    let code = apply(&module.source, window, edits);

    let text = match &module.comment {
        Some(comment) => format!("/*\n{comment}\n*/\n{code}"),
        None => code,
    };

    Rendered { text, diagnostics }
}

/// Apply non-overlapping edits that fall inside `window` and return the edited window text.
fn apply(source: &str, window: Range<usize>, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.retain(|(range, _)| range.start >= window.start && range.end <= window.end);
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(window.len());
    let mut cursor = window.start;
    for (range, replacement) in edits {
        if range.start < cursor {
            tracing::debug!(start = range.start, "skipping overlapping edit");
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..window.end]);
    out
}

/// JavaScript string literal for a require path.
fn quote(request: &str) -> String {
    serde_json::to_string(request).unwrap_or_else(|_| format!("\"{request}\""))
}

/// The `node_modules/<package>` prefix of a path, for plain and scoped packages.
fn package_root(path: &str) -> Option<&str> {
    let start = path.rfind("node_modules/")?;
    let after = start + "node_modules/".len();
    let rest = &path[after..];
    let segments = if rest.starts_with('@') { 2 } else { 1 };

    let mut end = after;
    for (count, segment) in rest.split('/').enumerate() {
        if count == segments {
            break;
        }
        end += segment.len() + usize::from(count > 0);
    }
    Some(&path[..end])
}

/// Require string that leads from the module at `from` to the module at `to`.
///
/// Targets inside a package the source is not part of are required by package name; everything
/// else gets a `./`- or `../`-prefixed relative path.
pub fn require_path(from: &str, to: &str) -> String {
    if let Some(target_root) = package_root(to) {
        if package_root(from) != Some(target_root) {
            let bare = &to[target_root.rfind("node_modules/").map_or(0, |i| i + "node_modules/".len())..];
            return bare.strip_suffix("/index").unwrap_or(bare).to_string();
        }
    }

    let from_dir = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(to, from_dir).unwrap_or_else(|| PathBuf::from(to));
    let relative = relative.to_string_lossy().replace('\\', "/");

    if relative.starts_with("../") || relative == ".." {
        relative
    } else {
        format!("./{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{DependencyEdge, DependencyKind, RenameSite};
    use crate::roles::Role;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "function(m, e, r) { var a = r(2); m.x = { e }; }";

    /// `len` bytes starting `offset` bytes into the first occurrence of `anchor`.
    fn at(anchor: &str, offset: usize, len: usize) -> Range<usize> {
        let start = SOURCE.find(anchor).unwrap() + offset;
        start..start + len
    }

    fn module() -> Module {
        Module {
            id: ModuleId::Index(1),
            chunk_ids: vec![ModuleId::Name("default".into())],
            source: SOURCE.to_string(),
            body: at("var", 0, "var a = r(2); m.x = { e };".len()),
            edges: vec![DependencyEdge {
                kind: DependencyKind::Direct,
                chunk: None,
                module: Some(ModuleId::Index(2)),
                request: None,
                literal: Some(at("r(2", 2, 1)),
            }],
            renames: vec![
                RenameSite { range: at("(m", 1, 1), kind: RenameKind::Param(Role::Module) },
                RenameSite { range: at(", e", 2, 1), kind: RenameKind::Param(Role::Exports) },
                RenameSite { range: at(", r", 2, 1), kind: RenameKind::Param(Role::Require) },
                RenameSite { range: at("r(2", 0, 1), kind: RenameKind::Param(Role::Require) },
                RenameSite { range: at("m.x", 0, 1), kind: RenameKind::Param(Role::Module) },
                RenameSite { range: at("m.x", 2, 1), kind: RenameKind::ExportsKey },
                RenameSite { range: at("{ e }", 2, 1), kind: RenameKind::Shorthand(Role::Exports) },
            ],
            lookup: IndexMap::new(),
            path: None,
            comment: None,
        }
    }

    fn paths(entries: &[(u64, &str)]) -> IndexMap<ModuleId, String> {
        entries
            .iter()
            .map(|(id, path)| (ModuleId::Index(*id), path.to_string()))
            .collect()
    }

    #[test]
    fn fixture_sites_cover_the_right_bytes() {
        let module = module();
        let text = |range: &Range<usize>| &SOURCE[range.clone()];
        assert_eq!(text(&module.body), "var a = r(2); m.x = { e };");
        assert_eq!(module.edges[0].literal.as_ref().map(text), Some("2"));
        let renamed: Vec<&str> = module.renames.iter().map(|site| text(&site.range)).collect();
        assert_eq!(renamed, ["m", "e", "r", "r", "m", "x", "e"]);
        assert_eq!(module.renames[3].range.start, SOURCE.find("r(2").unwrap());
    }

    #[test]
    fn body_is_rewritten() {
        let rendered = render(&module(), &paths(&[(1, "index"), (2, "2")]), RenderOptions::default());
        assert_eq!(
            rendered.text,
            r#"var a = require("./2"); module.exports = { e: exports };"#
        );
        assert!(rendered.diagnostics.is_empty());
    }

    #[test]
    fn closure_can_be_kept() {
        let options = RenderOptions {
            keep_closure: true,
            rename_variables: true,
        };
        let rendered = render(&module(), &paths(&[(1, "index"), (2, "lib/two")]), options);
        assert_eq!(
            rendered.text,
            r#"function(module, exports, require) { var a = require("./lib/two"); module.exports = { e: exports }; }"#
        );
    }

    #[test]
    fn renaming_can_be_disabled() {
        let options = RenderOptions {
            keep_closure: false,
            rename_variables: false,
        };
        let rendered = render(&module(), &paths(&[(1, "a/b"), (2, "c")]), options);
        assert_eq!(rendered.text, r#"var a = r("../c"); m.x = { e };"#);
    }

    #[test]
    fn dangling_edges_pass_through() {
        let rendered = render(&module(), &paths(&[(1, "index")]), RenderOptions::default());
        assert!(rendered.text.contains("require(2)"));
        assert_eq!(rendered.diagnostics.len(), 1);
        assert!(rendered.diagnostics[0].message.contains("module 2"));
    }

    #[test]
    fn comments_are_prepended() {
        let mut module = module();
        module.comment = Some("restored by hand".into());
        let rendered = render(&module, &paths(&[(1, "index"), (2, "2")]), RenderOptions::default());
        assert!(rendered.text.starts_with("/*\nrestored by hand\n*/\nvar a"));
    }

    #[test]
    fn rendering_is_repeatable() {
        let module = module();
        let table = paths(&[(1, "index"), (2, "2")]);
        let first = render(&module, &table, RenderOptions::default());
        let second = render(&module.clone(), &table, RenderOptions::default());
        assert_eq!(first, second);
        assert_eq!(module.source, SOURCE);
    }

    #[test]
    fn require_paths() {
        assert_eq!(require_path("index", "2"), "./2");
        assert_eq!(require_path("lib/a", "lib/b"), "./b");
        assert_eq!(require_path("lib/deep/a", "b"), "../../b");
        assert_eq!(require_path("foo/bar/baz/index", "node_modules/foo/index"), "foo");
        assert_eq!(require_path("index", "node_modules/react/lib/dom"), "react/lib/dom");
        assert_eq!(require_path("index", "node_modules/@scope/pkg/index"), "@scope/pkg");
        assert_eq!(
            require_path("node_modules/react/index", "node_modules/react/lib/dom"),
            "./lib/dom"
        );
    }
}
