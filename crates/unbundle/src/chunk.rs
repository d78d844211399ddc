//! Chunks: groups of modules that share one physical file.

use std::path::Path;

use indexmap::IndexMap;
use oxc_ast::ast::Expression;
use oxc_semantic::Semantic;

use crate::error::Result;
use crate::extract::extract;
use crate::module::{DependencyKind, Module};
use crate::module_id::{ChunkId, ModuleId};
use crate::roles::ClosureRoles;
use crate::table::read_table;

/// Id of the chunk holding the modules embedded in the bundle file itself.
pub const DEFAULT_CHUNK: &str = "default";

#[derive(Debug, Clone)]
pub struct Chunk {
    ids: Vec<ChunkId>,
    file_name: String,
    modules: IndexMap<ModuleId, Module>,
}

impl Chunk {
    /// Build a chunk from a parsed module table.
    ///
    /// `source` is the full text of the file the table was parsed from.
    pub(crate) fn from_table<'a>(
        ids: Vec<ChunkId>,
        file_name: String,
        source: &str,
        table: &'a Expression<'a>,
        semantic: &Semantic<'a>,
        roles: &ClosureRoles,
        path: &Path,
    ) -> Result<Self> {
        let mut modules = IndexMap::new();

        for entry in read_table(table, path)? {
            let extracted = extract(&entry.id, entry.closure, semantic, roles, &entry.lookup)?;
            let span = entry.closure.span;
            let module = Module {
                id: entry.id.clone(),
                chunk_ids: ids.clone(),
                source: source[span.start as usize..span.end as usize].to_string(),
                body: extracted.body,
                edges: extracted.edges,
                renames: extracted.renames,
                lookup: entry.lookup,
                path: None,
                comment: None,
            };
            if modules.insert(entry.id.clone(), module).is_some() {
                tracing::warn!(module = %entry.id, file = %file_name, "module table defines an id twice; keeping the last");
            }
        }

        tracing::debug!(
            chunk = ?ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
            file = %file_name,
            modules = modules.len(),
            "built chunk"
        );

        Ok(Self {
            ids,
            file_name,
            modules,
        })
    }

    pub fn ids(&self) -> &[ChunkId] {
        &self.ids
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_default(&self) -> bool {
        self.ids
            .iter()
            .any(|id| matches!(id, ModuleId::Name(name) if name == DEFAULT_CHUNK))
    }

    /// Whether this chunk answers to `id`.
    pub fn answers_to(&self, id: &ChunkId) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn add_id(&mut self, id: ChunkId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub(crate) fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        self.modules.values_mut()
    }

    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    pub(crate) fn module_mut(&mut self, id: &ModuleId) -> Option<&mut Module> {
        self.modules.get_mut(id)
    }

    pub(crate) fn retain_modules(&mut self, mut keep: impl FnMut(&ModuleId) -> bool) {
        self.modules.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Chunk ids named by lazy-load edges of this chunk's modules, in discovery order.
    pub fn referenced_chunks(&self) -> Vec<ChunkId> {
        let mut ids: Vec<ChunkId> = Vec::new();
        for edge in self.modules().flat_map(Module::edges) {
            if edge.kind != DependencyKind::Chunk {
                continue;
            }
            if let Some(chunk) = &edge.chunk {
                if !ids.contains(chunk) {
                    ids.push(chunk.clone());
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::locate;
    use crate::syntax::with_program;
    use crate::table::chunk_module_list;

    const BUNDLE: &str = r#"(function (modules) {
    function __req(id) {
        var module = { exports: {} };
        modules[id].call(module.exports, module, module.exports, __req);
        return module.exports;
    }
    return __req(0);
})([
    function (m, e, r) { r(1); r.e(2).then(r.bind(null, 5)); },
    function (m, e, r) { e.x = 1; }
]);"#;

    fn default_chunk(source: &str) -> Result<Chunk> {
        let path = Path::new("app.js");
        with_program(path, source, |_, semantic| {
            let located = locate(semantic, None, path)?;
            Chunk::from_table(
                vec![ModuleId::Name(DEFAULT_CHUNK.into())],
                "app.js".into(),
                source,
                located.table,
                semantic,
                &located.bootstrap.roles,
                path,
            )
        })
    }

    #[test]
    fn modules_keep_their_closure_text() {
        let chunk = default_chunk(BUNDLE).unwrap();
        assert!(chunk.is_default());
        assert_eq!(chunk.len(), 2);

        let second = chunk.module(&ModuleId::Index(1)).unwrap();
        assert_eq!(second.source(), "function (m, e, r) { e.x = 1; }");
        assert_eq!(second.chunk_ids(), &[ModuleId::Name("default".into())]);
    }

    #[test]
    fn lazy_loads_are_reported() {
        let chunk = default_chunk(BUNDLE).unwrap();
        assert_eq!(chunk.referenced_chunks(), vec![ModuleId::Index(2)]);
    }

    #[test]
    fn lazy_chunk_files() {
        let bundle = default_chunk(BUNDLE).unwrap();
        let roles = bundle_roles();
        let source = "webpackJsonp([2, 3], { 5: function (m, e, r) { r(1); } });";
        let path = Path::new("2.bundle.js");

        let chunk = with_program(path, source, |_, semantic| {
            let (ids, table) = chunk_module_list(semantic, path)?;
            Chunk::from_table(ids, "2.bundle.js".into(), source, table, semantic, &roles, path)
        })
        .unwrap();

        assert!(chunk.answers_to(&ModuleId::Index(3)));
        assert!(!chunk.is_default());
        let module = chunk.module(&ModuleId::Index(5)).unwrap();
        assert_eq!(module.dependencies().collect::<Vec<_>>(), vec![&ModuleId::Index(1)]);
        assert!(bundle.module(&ModuleId::Index(0)).is_some());
    }

    fn bundle_roles() -> ClosureRoles {
        let path = Path::new("app.js");
        with_program(path, BUNDLE, |_, semantic| {
            Ok(locate(semantic, None, path)?.bootstrap.roles)
        })
        .unwrap()
    }
}
