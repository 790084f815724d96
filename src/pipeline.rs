use std::path::PathBuf;

use anyhow::Result;

use crate::cache::{Cache, CacheKey};
use crate::extract::{Extract, ExtractSummary};
use crate::paths::Paths;
use crate::utils::sha256_file;
use crate::version::VersionResolver;

/// Fully resolved and validated arguments of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub dbf_path: PathBuf,
    pub output: PathBuf,
    pub agent_path: PathBuf,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The bundle digest matched the cache and `--force` was not given.
    Unchanged,
    Extracted {
        version: String,
        output_dir: PathBuf,
        summary: ExtractSummary,
    },
}

/// Extracts the bundle into `<output>/<version>` unless it is unchanged since
/// the last successful run.
///
/// The cache is saved only after the extraction finished, so a failed run
/// never records the digest of a bundle that was not extracted.
pub fn run(
    invocation: &Invocation,
    paths: &Paths,
    cache: &mut Cache,
    versions: &VersionResolver,
    extractor: &impl Extract,
) -> Result<Outcome> {
    let digest = sha256_file(&invocation.dbf_path)?;
    let changed = cache.get(CacheKey::DbfHash) != Some(digest.as_str());
    if !changed && !invocation.force {
        tracing::info!(
            "{} is unchanged since the last extraction",
            invocation.dbf_path.display()
        );
        return Ok(Outcome::Unchanged);
    }
    tracing::debug!("bundle digest {digest} (changed: {changed})");
    cache.set(CacheKey::DbfHash, digest);

    paths.init_dirs(cache)?;
    let version = versions.resolve(&invocation.agent_path, &invocation.output, cache)?;
    let output_dir = invocation.output.join(&version);
    let summary = extractor.extract(&invocation.dbf_path, &output_dir)?;

    cache.save()?;
    Ok(Outcome::Extracted {
        version,
        output_dir,
        summary,
    })
}
