use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use rabex::files::SerializedFile;
use rabex::files::bundlefile::{BundleFileReader, ExtractionConfig};

use crate::handle::SerializedFileHandle;

/// A memory mapped asset bundle, e.g. `dbf.unity3d`.
pub struct AssetBundle {
    pub path: PathBuf,
    reader: BundleFileReader<Cursor<Mmap>>,
}

/// A serialized file decoded out of an [`AssetBundle`].
pub struct BundleEntry {
    pub path: String,
    pub file: SerializedFile,
    pub data: Vec<u8>,
}

impl BundleEntry {
    pub fn handle<'a, P>(&'a self, tpk: &'a P) -> SerializedFileHandle<'a, P> {
        SerializedFileHandle::new(&self.file, &self.data, tpk)
    }
}

impl AssetBundle {
    pub fn open(path: impl AsRef<Path>) -> Result<AssetBundle> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("could not open bundle '{}'", path.display()))?;
        if file.metadata()?.is_dir() {
            bail!(
                "Attempted to load directory '{}' as assetbundle",
                path.display()
            );
        }
        let data = unsafe { Mmap::map(&file)? };

        let reader = BundleFileReader::from_reader(Cursor::new(data), &ExtractionConfig::default())
            .with_context(|| format!("'{}' is not a unity asset bundle", path.display()))?;

        Ok(AssetBundle {
            path: path.to_owned(),
            reader,
        })
    }

    /// Reads and parses every serialized file in the bundle.
    /// Resource blobs (`.resS`, `.resource`) are not included.
    pub fn serialized_files(&self) -> Result<Vec<BundleEntry>> {
        self.reader
            .serialized_files()
            .map(|entry| {
                let data = self.reader.read_at_entry(entry)?;
                let file = SerializedFile::from_reader(&mut Cursor::new(data.as_slice()))
                    .with_context(|| {
                        format!(
                            "failed to parse '{}' in '{}'",
                            entry.path,
                            self.path.display()
                        )
                    })?;
                Ok(BundleEntry {
                    path: entry.path.clone(),
                    file,
                    data,
                })
            })
            .collect()
    }
}
