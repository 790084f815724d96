use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;

/// The keys the tool stores in its cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// SHA-256 of the last bundle that was extracted successfully.
    DbfHash,
    OutputDir,
    DbfPath,
    AgentPath,
    VersionUrl,
}

impl CacheKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::DbfHash => "dbf-hash",
            CacheKey::OutputDir => "output-dir",
            CacheKey::DbfPath => "dbf-path",
            CacheKey::AgentPath => "agent-path",
            CacheKey::VersionUrl => "version-url",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat string-to-string mapping persisted as a single JSON object.
///
/// Mutations only touch memory. Nothing reaches the disk until [`Cache::save`],
/// so a run that fails halfway leaves the previous file in place.
#[derive(Debug)]
pub struct Cache {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl Cache {
    /// Reads the cache at `path`. A missing file yields an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match File::open(&path) {
            Ok(file) => serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("malformed cache file '{}'", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => IndexMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("could not read cache file '{}'", path.display()));
            }
        };

        Ok(Cache { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: CacheKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    pub fn set(&mut self, key: CacheKey, value: impl Into<String>) {
        self.entries.insert(key.as_str().to_owned(), value.into());
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("could not create cache directory '{}'", parent.display())
            })?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("could not write cache file '{}'", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.entries)?;
        writer.flush()?;

        tracing::debug!("saved {} cache entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
