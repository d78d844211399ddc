//! Output path inference.
//!
//! A module's path is derived from the chain of require strings that leads to it from the entry
//! module. Each step of a chain is the request a parent used for its child:
//!
//! ```text
//! ["./foo"]                          → foo
//! ["uuid", "./foo"]                  → node_modules/uuid/foo
//! ["uuid", "./bar/foo", "./baz"]     → node_modules/uuid/bar/baz
//! ["abc", "./foo", "uuid", "./bar"]  → node_modules/uuid/bar
//! ```
//!
//! Intermediate relative steps contribute their directory, the last step names the file, and a
//! bare package name restarts the path under `node_modules/<name>/`. Known paths short-circuit
//! the search for their module.
//!
//! Chains come from one breadth-first walk out of the entry and the known modules, visiting
//! children in graph order. A module keeps the first chain that reaches it, so every module has
//! a single canonical chain no matter which module is asked about first.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use rustc_hash::FxHashMap as HashMap;

use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::graph::ModuleGraph;
use crate::module::Module;
use crate::module_id::ModuleId;

/// One require step: the request string and the module it reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub request: String,
    pub module: ModuleId,
}

/// Resolved path of every module plus the findings made along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    /// Module id → output path without extension, in graph order.
    pub paths: IndexMap<ModuleId, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Assigns output paths to modules.
///
/// The chain table is built on first use and shared by every later lookup, so one resolver
/// should serve one resolution run.
pub struct PathResolver<'g> {
    graph: &'g ModuleGraph,
    entry: ModuleId,
    known: IndexMap<ModuleId, String>,
    /// parent → (child → request string)
    requests: HashMap<ModuleId, IndexMap<ModuleId, String>>,
    links: Option<IndexMap<ModuleId, Link>>,
}

/// How the walk first reached a module.
#[derive(Debug, Clone)]
struct Link {
    parent: Option<ModuleId>,
    step: Option<Step>,
}

impl<'g> PathResolver<'g> {
    pub fn new<'m>(
        graph: &'g ModuleGraph,
        modules: impl IntoIterator<Item = &'m Module>,
        known_paths: &IndexMap<ModuleId, String>,
        entry: ModuleId,
    ) -> Self {
        let mut known = known_paths.clone();
        let mut requests = HashMap::default();

        for module in modules {
            if let Some(implied) = module.id.implied_path() {
                known
                    .entry(module.id.clone())
                    .or_insert_with(|| implied.to_string());
            }

            let table: IndexMap<ModuleId, String> = module
                .dependencies()
                .map(|target| {
                    let request = module
                        .request_for(target)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("./{target}"));
                    (target.clone(), request)
                })
                .collect();
            requests.insert(module.id.clone(), table);
        }

        Self {
            graph,
            entry,
            known,
            requests,
            links: None,
        }
    }

    /// Resolve every module in the graph. Bare placeholder nodes get no path.
    pub fn resolve_all(&mut self) -> Result<PathTable> {
        let mut table = PathTable::default();
        let ids: Vec<ModuleId> = self
            .graph
            .nodes()
            .filter(|node| !node.bare)
            .map(|node| node.id.clone())
            .collect();

        for id in ids {
            let path = match self.hierarchy_of(&id) {
                Some(steps) => location(&id, &steps)?,
                None => {
                    table.diagnostics.push(Diagnostic::warn(
                        &id,
                        "no acyclic require chain reaches this module from the entry; using its id as the path",
                    ));
                    location(
                        &id,
                        &[Step {
                            request: format!("./{id}"),
                            module: id.clone(),
                        }],
                    )?
                }
            };
            tracing::debug!(module = %id, %path, "resolved module path");
            table.paths.insert(id, path);
        }

        Ok(table)
    }

    /// Require chain from the entry to `id`, or `None` when no acyclic chain exists.
    pub fn hierarchy_of(&mut self, id: &ModuleId) -> Option<Vec<Step>> {
        if self.links.is_none() {
            self.links = Some(self.walk());
        }
        let links = self.links.as_ref()?;
        chain(links, id)
    }

    fn request(&self, parent: &ModuleId, child: &ModuleId) -> String {
        self.requests
            .get(parent)
            .and_then(|table| table.get(child))
            .cloned()
            .unwrap_or_else(|| format!("./{child}"))
    }

    fn walk(&self) -> IndexMap<ModuleId, Link> {
        let mut links: IndexMap<ModuleId, Link> = IndexMap::new();
        let mut queue = VecDeque::new();

        let seeds = std::iter::once(&self.entry).chain(self.known.keys());
        for seed in seeds {
            if links.contains_key(seed) {
                continue;
            }
            let step = self.known.get(seed).map(|request| Step {
                request: request.clone(),
                module: seed.clone(),
            });
            links.insert(seed.clone(), Link { parent: None, step });
            queue.push_back(seed.clone());
        }

        while let Some(parent) = queue.pop_front() {
            for child in self.graph.children(&parent) {
                if links.contains_key(child) {
                    if tracing::enabled!(tracing::Level::DEBUG) {
                        self.report_alternative(&links, &parent, child);
                    }
                    continue;
                }
                let step = Step {
                    request: self.request(&parent, child),
                    module: child.clone(),
                };
                links.insert(
                    child.clone(),
                    Link {
                        parent: Some(parent.clone()),
                        step: Some(step),
                    },
                );
                queue.push_back(child.clone());
            }
        }

        links
    }

    fn report_alternative(
        &self,
        links: &IndexMap<ModuleId, Link>,
        parent: &ModuleId,
        child: &ModuleId,
    ) {
        if self.known.contains_key(child) {
            return;
        }
        let Some(mut alternative) = chain(links, parent) else {
            return;
        };
        if *parent == *child || alternative.iter().any(|step| step.module == *child) {
            tracing::debug!(module = %child, parent = %parent, "circular require chain is incomplete");
            return;
        }
        alternative.push(Step {
            request: self.request(parent, child),
            module: child.clone(),
        });
        if let Some(chosen) = chain(links, child) {
            tracing::debug!(
                module = %child,
                chosen = %describe(&chosen),
                alternative = %describe(&alternative),
                "module is reachable through several require chains"
            );
        }
    }
}

/// Follow parent links back to a seed.
fn chain(links: &IndexMap<ModuleId, Link>, id: &ModuleId) -> Option<Vec<Step>> {
    let mut steps = Vec::new();
    let mut current = links.get(id)?;
    loop {
        if let Some(step) = &current.step {
            steps.push(step.clone());
        }
        match &current.parent {
            Some(parent) => current = links.get(parent)?,
            None => break,
        }
    }
    steps.reverse();
    Some(steps)
}

fn describe(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| step.request.as_str())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Reduce a require chain to an output path, rejecting paths that leave the output root.
///
/// An empty request is treated as the directory it was made from, so a final `""` names `index`.
pub fn location(id: &ModuleId, steps: &[Step]) -> Result<String> {
    let mut package: Option<&str> = None;
    let mut parts: Vec<&str> = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let request = step.request.as_str();
        let last = index == steps.len() - 1;
        if !request.is_empty() && !request.starts_with('.') {
            package = Some(request);
            parts.clear();
        } else if request.is_empty() {
            parts.push(if last { "index" } else { "." });
        } else if last {
            parts.push(request);
        } else {
            parts.push(dirname(request));
        }
    }

    let mut joined = PathBuf::new();
    if let Some(package) = package {
        joined.push("node_modules");
        joined.push(package);
    }
    joined.extend(&parts);
    let joined = joined.clean();

    let path = match joined.to_str() {
        Some("" | ".") | None => "index".to_string(),
        Some(path) => path.replace('\\', "/"),
    };
    // A chain that stops at a package root names the package's index.
    let path = match package {
        Some(package) if path == format!("node_modules/{package}") => format!("{path}/index"),
        Some(_) | None => path,
    };

    if escapes_root(Path::new(&path)) {
        let candidates = steps
            .iter()
            .map(|step| format!("- {} ({})", step.request, step.module))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(Error::PathEscapesRoot {
            module: id.clone(),
            path,
            candidates,
        });
    }

    Ok(path)
}

fn dirname(request: &str) -> &str {
    match request.rfind('/') {
        Some(0) => "/",
        Some(index) => &request[..index],
        None => ".",
    }
}

fn escapes_root(path: &Path) -> bool {
    matches!(
        path.components().next(),
        Some(Component::ParentDir | Component::RootDir | Component::Prefix(_))
    )
}
