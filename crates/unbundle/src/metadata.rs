//! Per-bundle metadata file.
//!
//! Stored next to the bundle as `<bundle>.info.json`. It keeps the options that differ from the
//! defaults and explicit module path overrides, so manual corrections survive between runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::module_id::ModuleId;
use crate::options::Options;
use crate::runtime::{Runtime, RuntimeError, read_to_string};

/// The only metadata layout this crate reads and writes.
pub const METADATA_VERSION: u32 = 1;

const METADATA_SUFFIX: &str = ".info.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub version: u32,

    /// Non-default options.
    #[serde(default)]
    pub options: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleOverride>,
}

/// Explicit path (and optional comment) for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOverride {
    pub id: ModuleId,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl BundleMetadata {
    /// Location of the metadata file for a bundle.
    pub fn path_for(bundle: &Path) -> PathBuf {
        let mut name = bundle.as_os_str().to_os_string();
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }

    /// Snapshot the options (and per-module comments) worth persisting.
    pub fn snapshot<'a>(
        options: &Options,
        comments: impl IntoIterator<Item = (&'a ModuleId, &'a str)>,
    ) -> Result<Self> {
        let mut options = options.clone();
        let mut modules: Vec<ModuleOverride> = options
            .known_paths
            .drain(..)
            .map(|(id, path)| ModuleOverride {
                id,
                path,
                comment: None,
            })
            .collect();

        for (id, comment) in comments {
            match modules.iter_mut().find(|m| &m.id == id) {
                Some(entry) => entry.comment = Some(comment.to_string()),
                None => tracing::debug!(module = %id, "comment without a known path is not persisted"),
            }
        }

        Ok(Self {
            version: METADATA_VERSION,
            options: options.non_default()?,
            modules,
        })
    }

    /// Read the metadata file if it exists.
    pub async fn read(runtime: &dyn Runtime, path: &Path) -> Result<Option<Self>> {
        let text = match read_to_string(runtime, path).await {
            Ok(text) => text,
            Err(RuntimeError::FileNotFound(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let metadata: Self = serde_json::from_str(&text).map_err(|e| Error::Metadata {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if metadata.version != METADATA_VERSION {
            return Err(Error::Metadata {
                path: path.to_path_buf(),
                reason: format!(
                    "metadata file is version {}, but only version {METADATA_VERSION} is supported",
                    metadata.version
                ),
            });
        }

        Ok(Some(metadata))
    }

    /// Combine persisted options with the caller's options.
    ///
    /// Options the caller set explicitly (anything differing from the defaults) win over the
    /// persisted ones. Module overrides become known paths unless the caller already set one.
    pub fn merge_into(&self, options: &Options, path: &Path) -> Result<Options> {
        let invalid = |e: serde_json::Error| Error::Metadata {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut merged = Options::default()
            .overlay(&self.options)
            .map_err(invalid)?
            .overlay(&options.non_default()?)
            .map_err(invalid)?;

        for module in &self.modules {
            merged
                .known_paths
                .entry(module.id.clone())
                .or_insert_with(|| module.path.clone());
        }

        Ok(merged)
    }

    pub fn comments(&self) -> impl Iterator<Item = (&ModuleId, &str)> {
        self.modules
            .iter()
            .filter_map(|m| m.comment.as_deref().map(|c| (&m.id, c)))
    }

    pub async fn write(&self, runtime: &dyn Runtime, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        runtime.write_file(path, json.as_bytes()).await?;
        tracing::debug!(path = %path.display(), "wrote bundle metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestRuntime;
    use tempfile::TempDir;

    #[test]
    fn path_appends_suffix() {
        assert_eq!(
            BundleMetadata::path_for(Path::new("/srv/app.js")),
            PathBuf::from("/srv/app.js.info.json")
        );
    }

    #[test]
    fn snapshot_moves_known_paths_into_modules() {
        let mut options = Options::default();
        options.known_paths.insert(ModuleId::Index(4), "./lib/four".into());
        options.public_path_prefix = "https://cdn".into();

        let id = ModuleId::Index(4);
        let metadata = BundleMetadata::snapshot(&options, [(&id, "hand written")]).unwrap();

        assert_eq!(metadata.version, 1);
        assert!(metadata.options.contains_key("publicPathPrefix"));
        assert!(!metadata.options.contains_key("knownPaths"));
        assert_eq!(metadata.modules.len(), 1);
        assert_eq!(metadata.modules[0].comment.as_deref(), Some("hand written"));
    }

    #[test]
    fn caller_options_win_over_persisted() {
        let metadata: BundleMetadata = serde_json::from_str(
            r#"{
                "version": 1,
                "options": { "publicPathPrefix": "https://old", "chunkFileNameSuffix": ".c.js" },
                "modules": [ { "id": 1, "path": "./app" }, { "id": 2, "path": "./persisted" } ]
            }"#,
        )
        .unwrap();

        let mut options = Options::default();
        options.public_path_prefix = "https://new".into();
        options.known_paths.insert(ModuleId::Index(2), "./explicit".into());

        let merged = metadata
            .merge_into(&options, Path::new("x.info.json"))
            .unwrap();
        assert_eq!(merged.public_path_prefix, "https://new");
        assert_eq!(merged.chunk_file_name_suffix, ".c.js");
        assert_eq!(merged.known_paths[&ModuleId::Index(1)], "./app");
        assert_eq!(merged.known_paths[&ModuleId::Index(2)], "./explicit");
    }

    #[tokio::test]
    async fn read_rejects_other_versions() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path().to_path_buf());
        let path = runtime.write("b.js.info.json", r#"{"version": 2, "options": {}}"#);

        let err = BundleMetadata::read(&runtime, &path).await.unwrap_err();
        assert!(matches!(err, Error::Metadata { ref reason, .. } if reason.contains("version 2")));
    }

    #[tokio::test]
    async fn read_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path().to_path_buf());

        let metadata = BundleMetadata::read(&runtime, &temp.path().join("none.info.json"))
            .await
            .unwrap();
        assert!(metadata.is_none());
    }

    #[tokio::test]
    async fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path().to_path_buf());
        let path = temp.path().join("b.js.info.json");

        let mut options = Options::default();
        options.keep_closure = true;
        let metadata = BundleMetadata::snapshot(&options, []).unwrap();
        metadata.write(&runtime, &path).await.unwrap();

        let back = BundleMetadata::read(&runtime, &path).await.unwrap().unwrap();
        assert_eq!(back, metadata);
        assert!(runtime.read("b.js.info.json").contains("\"keepClosure\": true"));
    }
}
