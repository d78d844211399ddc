use std::ops::Range;
use std::path::Path;

use indexmap::IndexMap;
use path_clean::PathClean;

use crate::module_id::{ChunkId, ModuleId};
use crate::roles::Role;

/// How a module refers to another module or chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// `require(id)`
    Direct,
    /// `require.e(chunk)`, optionally followed by `.then(require.bind(null, id))`
    Chunk,
    /// `require.t.bind(null, id)`
    Interop,
}

/// One dependency declared by a module closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub kind: DependencyKind,
    pub chunk: Option<ChunkId>,
    pub module: Option<ModuleId>,
    /// The require string written in the bundle, when the literal was a string.
    pub request: Option<String>,
    /// Byte range of the module id literal, relative to the closure start.
    pub(crate) literal: Option<Range<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameKind {
    /// Declaration or plain use of a role parameter.
    Param(Role),
    /// Use as a shorthand property (`{ e }`), which must keep its key.
    Shorthand(Role),
    /// Property of `module.<key>` naming the exports object.
    ExportsKey,
}

/// A byte range (relative to the closure start) rewritten when renaming closure parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenameSite {
    pub range: Range<usize>,
    pub kind: RenameKind,
}

/// One reconstructed module.
///
/// Holds an owned copy of its closure text and everything extracted from it, so modules outlive
/// the syntax tree they were read from and can be rendered any number of times.
#[derive(Debug, Clone)]
pub struct Module {
    pub(crate) id: ModuleId,
    pub(crate) chunk_ids: Vec<ChunkId>,
    pub(crate) source: String,
    /// Range of the closure body statements within `source`.
    pub(crate) body: Range<usize>,
    pub(crate) edges: Vec<DependencyEdge>,
    pub(crate) renames: Vec<RenameSite>,
    pub(crate) lookup: IndexMap<String, ModuleId>,
    pub(crate) path: Option<String>,
    pub(crate) comment: Option<String>,
}

impl Module {
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Ids of the chunk the module was found in.
    pub fn chunk_ids(&self) -> &[ChunkId] {
        &self.chunk_ids
    }

    /// The module closure as written in the bundle.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Module ids this module depends on, in declaration order and without repeats.
    pub fn dependencies(&self) -> impl Iterator<Item = &ModuleId> {
        let mut seen = Vec::new();
        self.edges.iter().filter_map(move |edge| {
            let id = edge.module.as_ref()?;
            if seen.contains(&id) {
                return None;
            }
            seen.push(id);
            Some(id)
        })
    }

    /// Require string → module id table carried by the bundle for this module.
    pub fn lookup(&self) -> &IndexMap<String, ModuleId> {
        &self.lookup
    }

    /// The request string this module uses for `target`, if the bundle kept one.
    pub fn request_for(&self, target: &ModuleId) -> Option<&str> {
        self.lookup
            .iter()
            .find(|(_, id)| *id == target)
            .map(|(request, _)| request.as_str())
            .or_else(|| {
                self.edges
                    .iter()
                    .find(|edge| edge.module.as_ref() == Some(target))
                    .and_then(|edge| edge.request.as_deref())
            })
    }

    /// Synthesized path used when nothing better is known: `<chunk ids>-<id>`.
    pub fn default_path(&self) -> String {
        let chunks: Vec<String> = self.chunk_ids.iter().map(ToString::to_string).collect();
        format!("{}-{}", chunks.join("-"), self.id).replace(['/', '\\'], "-")
    }

    /// Resolved output path without the `.js` extension.
    pub fn path(&self) -> String {
        self.path.clone().unwrap_or_else(|| self.default_path())
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Resolve a require string the way Node would from this module's output location.
    ///
    /// Returns a `./`-rooted file path with a `.js` extension. Bare package names resolve into
    /// `./node_modules/<package>/`, with `index.js` when no file is named.
    pub fn resolve_request(&self, request: &str) -> String {
        if request.starts_with('/') {
            return with_extension(request);
        }

        if request.starts_with("./") || request.starts_with("../") {
            let own = Path::new("/").join(self.path()).clean();
            let dir = own.parent().unwrap_or_else(|| Path::new("/"));
            let joined = dir.join(request).clean();
            return format!(".{}", with_extension(&joined.to_string_lossy()));
        }

        let (package, rest) = match request.split_once('/') {
            Some((package, rest)) if !package.starts_with('@') => (package.to_string(), rest.to_string()),
            _ => {
                let mut parts = request.splitn(3, '/');
                let scope = parts.next().unwrap_or_default();
                let name = parts.next();
                let rest = parts.next().unwrap_or_default();
                match name {
                    Some(name) => (format!("{scope}/{name}"), rest.to_string()),
                    None => (scope.to_string(), String::new()),
                }
            }
        };
        let file = if rest.is_empty() {
            "index.js".to_string()
        } else {
            with_extension(&rest)
        };
        format!("./node_modules/{package}/{file}")
    }
}

fn with_extension(path: &str) -> String {
    if path.ends_with(".js") {
        path.to_string()
    } else {
        format!("{path}.js")
    }
}
