use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::module_id::{ChunkId, ModuleId};

/// Default maximum nesting of lazily loaded chunks.
pub const DEFAULT_MAX_CHUNK_DEPTH: usize = 32;

/// Options controlling how a bundle is analysed and written.
///
/// Serialized in camelCase; this is the shape stored under `options` in the bundle metadata file
/// and accepted by the CLI configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Output root for reconstructed modules.
    pub dist_path: PathBuf,

    /// Appended to a chunk id to form its file name.
    pub chunk_file_name_suffix: String,

    /// Prepended to the bootstrap's public path when fetching chunks remotely.
    pub public_path_prefix: String,

    /// Explicit chunk id → file name overrides.
    pub chunk_name_mapping: IndexMap<ChunkId, String>,

    /// Request options for remote chunk retrieval.
    pub chunk_http: HttpOptions,

    /// Explicit module id → path overrides (no `.js` extension).
    pub known_paths: IndexMap<ModuleId, String>,

    /// Entry module override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<ModuleId>,

    /// Byte offset of the bootstrap function when automatic detection fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_offset: Option<u32>,

    pub max_chunk_depth: usize,

    /// Emit the whole module closure instead of only its body.
    pub keep_closure: bool,

    /// Rename closure parameters to `require`, `module` and `exports`.
    pub rename_variables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dist_path: PathBuf::from("./dist"),
            chunk_file_name_suffix: ".bundle.js".to_string(),
            public_path_prefix: String::new(),
            chunk_name_mapping: IndexMap::new(),
            chunk_http: HttpOptions::default(),
            known_paths: IndexMap::new(),
            entry_point: None,
            bootstrap_offset: None,
            max_chunk_depth: DEFAULT_MAX_CHUNK_DEPTH,
            keep_closure: false,
            rename_variables: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpOptions {
    /// Extra request headers.
    pub headers: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Options {
    /// The options that differ from [`Options::default`], as a JSON object.
    pub fn non_default(&self) -> serde_json::Result<Map<String, Value>> {
        let defaults = as_object(serde_json::to_value(Self::default())?);
        let current = as_object(serde_json::to_value(self)?);

        Ok(current
            .into_iter()
            .filter(|(key, value)| defaults.get(key) != Some(value))
            .collect())
    }

    /// Overlay a JSON object of options onto these options.
    ///
    /// Keys missing from `overlay` keep their current value.
    pub fn overlay(&self, overlay: &Map<String, Value>) -> serde_json::Result<Self> {
        let mut merged = as_object(serde_json::to_value(self)?);
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(merged))
    }

    /// File name for a lazily loaded chunk.
    pub fn chunk_file_name(&self, chunk: &ChunkId) -> String {
        self.chunk_name_mapping
            .get(chunk)
            .cloned()
            .unwrap_or_else(|| format!("{chunk}{}", self.chunk_file_name_suffix))
    }

    /// URL of a chunk file on the remote host.
    ///
    /// The prefix and the public path are joined with exactly one `/`.
    pub fn chunk_url(&self, public_path: &str, file_name: &str) -> String {
        let prefix = self.public_path_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return format!("{public_path}{file_name}");
        }
        format!("{prefix}/{}{file_name}", public_path.trim_start_matches('/'))
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
