//! Test utilities for the unbundle engine.
//!
//! - `TestRuntime`: a filesystem runtime rooted in a temporary directory
//! - `StaticFetcher`: a chunk fetcher serving canned responses by URL
//!
//! Only compiled for tests or with the `test-utils` feature.

#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::fetch::{ChunkFetcher, FetchError};
use crate::options::HttpOptions;
use crate::runtime::{Runtime, RuntimeError, RuntimeResult};

/// Simple test runtime that wraps std::fs.
///
/// ```rust,ignore
/// use tempfile::TempDir;
/// use unbundle::test_utils::TestRuntime;
///
/// let temp = TempDir::new().unwrap();
/// let runtime = TestRuntime::new(temp.path().to_path_buf());
/// runtime.write("app.js", "console.log(1)");
/// ```
#[derive(Debug)]
pub struct TestRuntime {
    cwd: PathBuf,
}

impl TestRuntime {
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Write a fixture file relative to the runtime root and return its absolute path.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.cwd.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Read a file relative to the runtime root.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.cwd.join(relative)).unwrap()
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(e.to_string())
            }
        })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        std::fs::write(path, content).map_err(|e| RuntimeError::Io(e.to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        if recursive {
            std::fs::create_dir_all(path).map_err(|e| RuntimeError::Io(e.to_string()))
        } else {
            std::fs::create_dir(path).map_err(|e| RuntimeError::Io(e.to_string()))
        }
    }
}

/// Chunk fetcher that serves fixed bodies and records every requested URL.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChunkFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _options: &HttpOptions) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().push(url.to_string());
        self.responses.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_runtime_read_write() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path().to_path_buf());

        let file_path = temp.path().join("test.txt");
        runtime.write_file(&file_path, b"hello world").await.unwrap();

        let content = runtime.read_file(&file_path).await.unwrap();
        assert_eq!(content, b"hello world");
    }

    #[tokio::test]
    async fn static_fetcher_records_requests() {
        let fetcher = StaticFetcher::new().with("https://cdn/1.js", "x");

        assert_eq!(
            fetcher.fetch("https://cdn/1.js", &HttpOptions::default()).await.unwrap(),
            b"x"
        );
        assert!(fetcher.fetch("https://cdn/2.js", &HttpOptions::default()).await.is_err());
        assert_eq!(fetcher.requests(), vec!["https://cdn/1.js", "https://cdn/2.js"]);
    }
}
