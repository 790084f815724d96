use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use rabex::tpk::TpkTypeTreeBlob;
use rabex::typetree::typetree_cache::sync::TypeTreeCache;
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::bundle::AssetBundle;
use crate::progress;
use crate::unity::types::MonoBehaviour;

/// Extension of the record files. The viewer expects exactly this spelling.
pub const RECORD_EXTENSION: &str = "join";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Records written, including ones that replaced an earlier record of the same name.
    pub records: usize,
    /// Distinct files in the output directory.
    pub files: usize,
    pub overwritten: usize,
}

pub trait Extract {
    fn extract(&self, bundle: &Path, output_dir: &Path) -> Result<ExtractSummary>;
}

/// Writes every `MonoBehaviour` of a bundle as `<m_Name>.join`.
pub struct BundleExtractor {
    tpk: TypeTreeCache<TpkTypeTreeBlob>,
    show_progress: bool,
}

impl BundleExtractor {
    pub fn new(show_progress: bool) -> Self {
        BundleExtractor {
            tpk: TypeTreeCache::new(TpkTypeTreeBlob::embedded()),
            show_progress,
        }
    }
}

impl Extract for BundleExtractor {
    fn extract(&self, bundle: &Path, output_dir: &Path) -> Result<ExtractSummary> {
        let bundle = AssetBundle::open(bundle)?;
        let entries = bundle.serialized_files()?;

        let mut objects = Vec::new();
        for entry in &entries {
            let handle = entry.handle(&self.tpk);
            let before = objects.len();
            objects.extend(handle.objects_of::<MonoBehaviour>());
            tracing::debug!(
                "{}: {} MonoBehaviours",
                entry.path,
                objects.len() - before
            );
        }

        let bar = progress::record_bar(objects.len() as u64, self.show_progress);
        let mut writer = RecordWriter::create(output_dir)?;
        for object in objects {
            let path_id = object.path_id();
            let record = object
                .cast_owned::<Value>()
                .read()
                .with_context(|| format!("failed to decode MonoBehaviour {path_id}"))?;
            writer
                .write(&record)
                .with_context(|| format!("failed to write MonoBehaviour {path_id}"))?;
            bar.inc(1);
        }
        bar.finish_and_clear();

        let summary = writer.finish();
        tracing::info!(
            "wrote {} records to {}",
            summary.files,
            output_dir.display()
        );
        Ok(summary)
    }
}

/// Writes decoded records into one directory, one file per name.
/// A later record with the same name replaces the earlier file.
pub struct RecordWriter {
    dir: PathBuf,
    seen: FxHashSet<String>,
    summary: ExtractSummary,
}

impl RecordWriter {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("could not create '{}'", dir.display()))?;
        Ok(RecordWriter {
            dir,
            seen: FxHashSet::default(),
            summary: ExtractSummary::default(),
        })
    }

    pub fn write(&mut self, record: &Value) -> Result<PathBuf> {
        let name = record_name(record)?;
        let path = self.dir.join(format!("{name}.{RECORD_EXTENSION}"));

        let file = File::create(&path)
            .with_context(|| format!("could not create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record)?;
        writer.flush()?;

        self.summary.records += 1;
        if !self.seen.insert(name.to_owned()) {
            tracing::warn!("duplicate record '{name}', overwriting {}", path.display());
            self.summary.overwritten += 1;
        }
        Ok(path)
    }

    pub fn finish(self) -> ExtractSummary {
        ExtractSummary {
            files: self.seen.len(),
            ..self.summary
        }
    }
}

/// The `m_Name` of a record, which must be usable as a plain file name.
pub fn record_name(record: &Value) -> Result<&str> {
    let name = record
        .get("m_Name")
        .and_then(Value::as_str)
        .context("record has no m_Name string")?;

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) if *component == *name => Ok(name),
        _ => bail!("record name '{name}' is not a valid file name"),
    }
}
