mod common;

use std::cell::Cell;
use std::path::Path;

use anyhow::{Result, bail};
use auto_asset_tool::extract::RecordWriter;
use auto_asset_tool::{Cache, CacheKey, Extract, ExtractSummary, Outcome, VersionResolver, pipeline};
use serde_json::json;
use tempfile::tempdir;

/// Writes a single record instead of decoding a real bundle.
#[derive(Default)]
struct StubExtractor {
    calls: Cell<usize>,
    fail: bool,
}

impl Extract for StubExtractor {
    fn extract(&self, _bundle: &Path, output_dir: &Path) -> Result<ExtractSummary> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            bail!("bundle is corrupt");
        }
        let mut writer = RecordWriter::create(output_dir)?;
        writer.write(&json!({"m_Name": "CARD", "Records": []}))?;
        Ok(writer.finish())
    }
}

#[test]
fn unchanged_bundle_is_skipped() {
    let dir = tempdir().unwrap();
    let paths = common::paths_in(dir.path());
    let invocation = common::invocation_in(dir.path(), "34.2.0.231720");
    let extractor = StubExtractor::default();

    let mut cache = Cache::load(&paths.defaults().cache).unwrap();
    let outcome = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    )
    .unwrap();

    let Outcome::Extracted {
        version,
        output_dir,
        summary,
    } = outcome
    else {
        panic!("first run should extract");
    };
    assert_eq!(version, "34.2.0.231720");
    assert_eq!(output_dir, dir.path().join("out").join("34.2.0.231720"));
    assert!(output_dir.join("CARD.join").is_file());
    assert_eq!(summary.files, 1);
    assert!(cache.get(CacheKey::DbfHash).is_some());

    let saved = std::fs::read(&paths.defaults().cache).unwrap();
    let mut cache = Cache::load(&paths.defaults().cache).unwrap();
    let outcome = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    )
    .unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(extractor.calls.get(), 1);
    assert_eq!(std::fs::read(&paths.defaults().cache).unwrap(), saved);
}

#[test]
fn force_extracts_into_next_version() {
    let dir = tempdir().unwrap();
    let paths = common::paths_in(dir.path());
    let mut invocation = common::invocation_in(dir.path(), "34.2.0.231720");
    let extractor = StubExtractor::default();
    let mut cache = Cache::load(&paths.defaults().cache).unwrap();

    pipeline::run(&invocation, &paths, &mut cache, &VersionResolver::default(), &extractor)
        .unwrap();

    invocation.force = true;
    let outcome = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    )
    .unwrap();

    match outcome {
        Outcome::Extracted { version, .. } => assert_eq!(version, "34.2.0.231721"),
        Outcome::Unchanged => panic!("forced run should extract"),
    }
    assert_eq!(extractor.calls.get(), 2);
    assert!(dir.path().join("out/34.2.0.231720/CARD.join").is_file());
    assert!(dir.path().join("out/34.2.0.231721/CARD.join").is_file());
}

#[test]
fn changed_bundle_is_extracted_again() {
    let dir = tempdir().unwrap();
    let paths = common::paths_in(dir.path());
    let invocation = common::invocation_in(dir.path(), "34.2.0.231720");
    let extractor = StubExtractor::default();
    let mut cache = Cache::load(&paths.defaults().cache).unwrap();

    pipeline::run(&invocation, &paths, &mut cache, &VersionResolver::default(), &extractor)
        .unwrap();
    let first_hash = cache.get(CacheKey::DbfHash).map(str::to_owned);

    std::fs::write(&invocation.dbf_path, b"UnityFS patched bundle").unwrap();
    let outcome = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    )
    .unwrap();

    assert!(matches!(outcome, Outcome::Extracted { .. }));
    assert_ne!(cache.get(CacheKey::DbfHash).map(str::to_owned), first_hash);
    assert_eq!(extractor.calls.get(), 2);
}

#[test]
fn failed_extraction_does_not_save_the_cache() {
    let dir = tempdir().unwrap();
    let paths = common::paths_in(dir.path());
    let invocation = common::invocation_in(dir.path(), "34.2.0.231720");
    let extractor = StubExtractor {
        fail: true,
        ..StubExtractor::default()
    };
    let mut cache = Cache::load(&paths.defaults().cache).unwrap();

    let result = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    );

    assert!(result.is_err());
    assert_eq!(extractor.calls.get(), 1);
    assert!(!paths.defaults().cache.exists());
}
