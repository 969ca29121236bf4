//! On-disk export cache keyed by input content.
//!
//! The key is a SHA-256 over the build parameters (JSON, sorted keys) and,
//! for each source file, its path, modification time in seconds and content
//! hash. Entries live at `{dir}/{key}.out`. Every failure here is logged and
//! treated as a miss.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub(crate) struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Computes the key for `params` over `files`. Unreadable files are skipped.
    pub(crate) fn key(params: &serde_json::Value, files: &[PathBuf]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(params.to_string().as_bytes());
        for path in files {
            let (Ok(meta), Ok(bytes)) = (std::fs::metadata(path), std::fs::read(path)) else {
                tracing::debug!("Cache key skips unreadable {}", path.display());
                continue;
            };
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_secs());
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update(mtime.to_string().as_bytes());
            hasher.update(Sha256::digest(&bytes));
        }
        hex::encode(hasher.finalize())
    }

    fn entry(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.out"))
    }

    pub(crate) fn read(&self, key: &str) -> Option<String> {
        let path = self.entry(key);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!("Cache hit: {}", path.display());
                Some(text)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {e}", path.display());
                None
            }
        }
    }

    pub(crate) fn write(&self, key: &str, text: &str) {
        let path = self.entry(key);
        if let Err(e) = std::fs::create_dir_all(&self.dir).and_then(|()| std::fs::write(&path, text)) {
            tracing::warn!("Failed to write cache entry {}: {e}", path.display());
        } else {
            tracing::debug!("Cached export at {}", path.display());
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}
