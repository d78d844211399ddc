//! The bundle aggregate: one root file, its chunks and their modules.
//!
//! ```text
//! Bundle::open ──▶ metadata merge
//!      │
//!      ▼
//! parse ──▶ bootstrap ──▶ default chunk ──▶ lazy chunk worklist (local file, then HTTP)
//!      │
//!      ▼
//! resolve_paths ──▶ adopt_package* ──▶ render / write_all
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use path_clean::PathClean;
use rustc_hash::FxHashSet as HashSet;
use tokio::task::JoinSet;

use crate::bootstrap::{Bootstrap, locate};
use crate::chunk::{Chunk, DEFAULT_CHUNK};
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::fetch::ChunkFetcher;
use crate::graph::ModuleGraph;
use crate::metadata::BundleMetadata;
use crate::module::Module;
use crate::module_id::{ChunkId, ModuleId};
use crate::options::Options;
use crate::paths::PathResolver;
use crate::rewrite::{self, RenderOptions, Rendered};
use crate::runtime::{Runtime, RuntimeError, read_to_string};
use crate::syntax::with_program;
use crate::table::chunk_module_list;

/// Outcome of [`Bundle::write_all`].
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Files written, in module order.
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A bundle under reconstruction.
///
/// Options can be changed until [`Bundle::parse`] runs; parsing happens once and later calls
/// return immediately.
#[derive(Debug)]
pub struct Bundle {
    path: PathBuf,
    runtime: Arc<dyn Runtime>,
    fetcher: Arc<dyn ChunkFetcher>,
    options: Options,
    metadata_existed: bool,
    comments: IndexMap<ModuleId, String>,
    bootstrap: Option<Bootstrap>,
    chunks: Vec<Chunk>,
    graph: ModuleGraph,
}

impl Bundle {
    /// Open a bundle and fold in its persisted metadata, if any.
    pub async fn open(
        path: impl AsRef<Path>,
        runtime: Arc<dyn Runtime>,
        fetcher: Arc<dyn ChunkFetcher>,
        options: Options,
    ) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())
            .map_err(|e| {
                RuntimeError::Io(format!(
                    "Failed to resolve {}: {e}",
                    path.as_ref().display()
                ))
            })?
            .clean();

        let metadata_path = BundleMetadata::path_for(&path);
        let metadata = BundleMetadata::read(runtime.as_ref(), &metadata_path).await?;

        let (options, comments) = match &metadata {
            Some(metadata) => {
                let comments = metadata
                    .comments()
                    .map(|(id, comment)| (id.clone(), comment.to_string()))
                    .collect();
                (metadata.merge_into(&options, &metadata_path)?, comments)
            }
            None => (options, IndexMap::new()),
        };

        tracing::debug!(
            bundle = %path.display(),
            metadata = metadata.is_some(),
            "opened bundle"
        );

        Ok(Self {
            path,
            runtime,
            fetcher,
            options,
            metadata_existed: metadata.is_some(),
            comments,
            bootstrap: None,
            chunks: Vec::new(),
            graph: ModuleGraph::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn is_parsed(&self) -> bool {
        self.bootstrap.is_some()
    }

    pub fn bootstrap(&self) -> Option<&Bootstrap> {
        self.bootstrap.as_ref()
    }

    /// Locate the bootstrap, build every chunk and the module graph, then persist metadata.
    pub async fn parse(&mut self) -> Result<()> {
        if self.is_parsed() {
            return Ok(());
        }

        let source = read_to_string(self.runtime.as_ref(), &self.path).await?;
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let offset = self.options.bootstrap_offset;
        let path = self.path.clone();

        let (bootstrap, default_chunk) = with_program(&path, &source, |_, semantic| {
            let located = locate(semantic, offset, &path)?;
            let chunk = Chunk::from_table(
                vec![ModuleId::Name(DEFAULT_CHUNK.to_string())],
                file_name,
                &source,
                located.table,
                semantic,
                &located.bootstrap.roles,
                &path,
            )?;
            Ok((located.bootstrap, chunk))
        })?;

        let mut queue: VecDeque<(ChunkId, usize)> = default_chunk
            .referenced_chunks()
            .into_iter()
            .map(|id| (id, 1))
            .collect();
        let mut requested: HashSet<ChunkId> = HashSet::default();
        self.chunks.push(default_chunk);

        let public_path = bootstrap.public_path.clone().unwrap_or_default();
        while let Some((id, depth)) = queue.pop_front() {
            if self.chunk(&id).is_some() || !requested.insert(id.clone()) {
                continue;
            }
            if depth > self.options.max_chunk_depth {
                return Err(Error::MaxChunkDepth {
                    chunk: id,
                    max_depth: self.options.max_chunk_depth,
                });
            }

            let mut chunk = self.load_chunk(&id, &bootstrap, &public_path).await?;
            if !chunk.answers_to(&id) {
                tracing::warn!(chunk = %id, file = chunk.file_name(), "chunk file does not list the requested id");
                chunk.add_id(id.clone());
            }
            queue.extend(chunk.referenced_chunks().into_iter().map(|next| (next, depth + 1)));
            self.add_chunk(chunk);
        }

        for (id, comment) in &self.comments {
            if let Some(module) = self.chunks.iter_mut().find_map(|chunk| chunk.module_mut(id)) {
                module.set_comment(Some(comment.clone()));
            }
        }

        self.graph = ModuleGraph::build(self.modules());
        tracing::info!(
            chunks = self.chunks.len(),
            modules = self.graph.len(),
            "parsed bundle"
        );
        self.bootstrap = Some(bootstrap);

        self.write_metadata(false).await?;
        Ok(())
    }

    /// Read a lazily loaded chunk from next to the bundle, or from its public URL.
    async fn load_chunk(
        &self,
        id: &ChunkId,
        bootstrap: &Bootstrap,
        public_path: &str,
    ) -> Result<Chunk> {
        let file_name = self.options.chunk_file_name(id);
        let local = self
            .path
            .parent()
            .unwrap_or_else(|| Path::new("/"))
            .join(&file_name);

        let (origin, source) = match read_to_string(self.runtime.as_ref(), &local).await {
            Ok(text) => (local, text),
            Err(local_error) => {
                let url = self.options.chunk_url(public_path, &file_name);
                tracing::debug!(chunk = %id, local = %local.display(), %url, "chunk not on disk, fetching");
                match self.fetcher.fetch(&url, &self.options.chunk_http).await {
                    Ok(bytes) => (PathBuf::from(&url), String::from_utf8_lossy(&bytes).into_owned()),
                    Err(remote_error) => {
                        return Err(Error::ChunkUnavailable {
                            chunk: id.clone(),
                            local,
                            local_error,
                            url,
                            remote_error,
                        });
                    }
                }
            }
        };

        with_program(&origin, &source, |_, semantic| {
            let (ids, table) = chunk_module_list(semantic, &origin)?;
            Chunk::from_table(
                ids,
                file_name,
                &source,
                table,
                semantic,
                &bootstrap.roles,
                &origin,
            )
        })
    }

    /// Add a chunk, dropping modules an earlier chunk already defines.
    fn add_chunk(&mut self, mut chunk: Chunk) {
        let existing: HashSet<ModuleId> = self.modules().map(|module| module.id().clone()).collect();
        chunk.retain_modules(|id| {
            let fresh = !existing.contains(id);
            if !fresh {
                tracing::warn!(module = %id, "module defined by more than one chunk; keeping the first");
            }
            fresh
        });
        self.chunks.push(chunk);
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The chunk answering to `id`.
    pub fn chunk(&self, id: &ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.answers_to(id))
    }

    pub fn chunk_by_file_name(&self, file_name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.file_name() == file_name)
    }

    pub fn default_chunk(&self) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.is_default())
    }

    /// Every module of every chunk, in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.chunks.iter().flat_map(Chunk::modules)
    }

    pub fn module(&self, id: &ModuleId) -> Result<&Module> {
        self.chunks
            .iter()
            .find_map(|chunk| chunk.module(id))
            .ok_or_else(|| Error::UnknownModule(id.clone()))
    }

    fn module_mut(&mut self, id: &ModuleId) -> Result<&mut Module> {
        self.chunks
            .iter_mut()
            .find_map(|chunk| chunk.module_mut(id))
            .ok_or_else(|| Error::UnknownModule(id.clone()))
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// Entry module: the `entryPoint` option, else the one the bootstrap starts, else 0.
    pub fn entry(&self) -> ModuleId {
        self.options
            .entry_point
            .clone()
            .or_else(|| self.bootstrap.as_ref().and_then(|b| b.entry.clone()))
            .unwrap_or(ModuleId::Index(0))
    }

    /// Assign an output path to every module.
    pub fn resolve_paths(&mut self) -> Result<Vec<Diagnostic>> {
        let table = {
            let mut resolver = PathResolver::new(
                &self.graph,
                self.chunks.iter().flat_map(Chunk::modules),
                &self.options.known_paths,
                self.entry(),
            );
            resolver.resolve_all()?
        };

        for module in self.chunks.iter_mut().flat_map(Chunk::modules_mut) {
            if let Some(path) = table.paths.get(&module.id) {
                module.set_path(path.clone());
            }
        }
        Ok(table.diagnostics)
    }

    /// Make `id` the root of package `name`.
    ///
    /// The module moves to `node_modules/<name>/index` and every module it transitively depends
    /// on is moved under `node_modules/<name>/`. Each dependency is moved once, even in cycles.
    pub fn adopt_package(&mut self, id: &ModuleId, name: &str) -> Result<()> {
        let prefix = format!("node_modules/{name}");
        self.module_mut(id)?.set_path(format!("{prefix}/index"));

        let dependencies: Vec<ModuleId> = self
            .graph
            .transitive_dependencies(id)
            .into_iter()
            .filter(|dep| !self.graph.is_bare(dep))
            .collect();
        for dep in &dependencies {
            let module = self.module_mut(dep)?;
            let moved = format!("{prefix}/{}", module.path());
            module.set_path(moved);
        }

        tracing::info!(module = %id, package = name, moved = dependencies.len(), "adopted package");
        Ok(())
    }

    /// Current output path of every module.
    pub fn path_table(&self) -> IndexMap<ModuleId, String> {
        self.modules()
            .map(|module| (module.id().clone(), module.path()))
            .collect()
    }

    /// The module a request string written in module `from` names, if any.
    pub fn module_for_request(&self, from: &ModuleId, request: &str) -> Result<Option<&Module>> {
        let target = self.module(from)?.resolve_request(request);
        Ok(self
            .modules()
            .find(|module| format!("./{}.js", module.path()) == target))
    }

    /// Render one module with the current path table.
    pub fn render(&self, id: &ModuleId) -> Result<Rendered> {
        let module = self.module(id)?;
        Ok(rewrite::render(
            module,
            &self.path_table(),
            RenderOptions::from(&self.options),
        ))
    }

    /// Render every module and write it to `<distPath>/<path>.js`.
    pub async fn write_all(&self) -> Result<WriteReport> {
        let paths = self.path_table();
        let render_options = RenderOptions::from(&self.options);
        let mut report = WriteReport::default();
        let mut writes = JoinSet::new();

        for module in self.modules() {
            let rendered = rewrite::render(module, &paths, render_options);
            report.diagnostics.extend(rendered.diagnostics);

            let file = self.options.dist_path.join(format!("{}.js", module.path()));
            report.files.push(file.clone());

            let runtime = Arc::clone(&self.runtime);
            writes.spawn(async move {
                if let Some(parent) = file.parent() {
                    runtime.create_dir(parent, true).await?;
                }
                runtime.write_file(&file, rendered.text.as_bytes()).await
            });
        }

        while let Some(joined) = writes.join_next().await {
            joined.map_err(|e| RuntimeError::Other(format!("Task join error: {e}")))??;
        }

        tracing::info!(
            files = report.files.len(),
            dist = %self.options.dist_path.display(),
            "wrote modules"
        );
        Ok(report)
    }

    /// Persist options and known paths next to the bundle.
    ///
    /// Skipped when the file already existed at open time, unless `force` is set. Returns
    /// whether the file was written.
    pub async fn write_metadata(&self, force: bool) -> Result<bool> {
        if self.metadata_existed && !force {
            return Ok(false);
        }

        let comments: Vec<(&ModuleId, &str)> = self
            .modules()
            .filter_map(|module| module.comment().map(|comment| (module.id(), comment)))
            .collect();
        let metadata = BundleMetadata::snapshot(&self.options, comments)?;
        metadata
            .write(self.runtime.as_ref(), &BundleMetadata::path_for(&self.path))
            .await?;
        Ok(true)
    }
}
