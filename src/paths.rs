//! Default and effective locations of everything the tool reads or writes.
//!
//! Defaults are computed once from a [`Host`] and never look at the cache.
//! The effective values prefer an override stored in the [`Cache`] and fall
//! back to the default.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_derive::Deserialize;

use crate::cache::{Cache, CacheKey};

pub const APP_DIR: &str = "HearthstoneClientTool";
pub const CACHE_FILE: &str = "auto-asset-tool-cache.json";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OUTPUT_DIR: &str = "Game Data";
/// Location of the DBF bundle relative to the install directory.
pub const DBF_RELATIVE: &str = "Data/Win/dbf.unity3d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Other
        }
    }

    /// Where the Battle.net agent keeps its product database.
    pub fn agent_db(self) -> PathBuf {
        match self {
            OsFamily::MacOs => PathBuf::from("/Users/Shared/Battle.net/Agent/product.db"),
            OsFamily::Windows | OsFamily::Other => {
                PathBuf::from(r"C:\ProgramData\Battle.net\Agent\product.db")
            }
        }
    }
}

/// The parts of the operating environment the defaults depend on.
#[derive(Debug, Clone)]
pub struct Host {
    pub os: OsFamily,
    /// `%APPDATA%` on windows, `~/Library/Application Support` on macOS, `~/.cache` elsewhere.
    pub base_dir: Option<PathBuf>,
    /// Game install directory from the registry.
    pub install_location: Option<PathBuf>,
}

impl Host {
    pub fn detect() -> Self {
        let os = OsFamily::current();
        let base_dir = match os {
            OsFamily::Windows | OsFamily::MacOs => dirs::data_dir(),
            OsFamily::Other => dirs::cache_dir(),
        };

        Host {
            os,
            base_dir,
            install_location: crate::registry::install_location(),
        }
    }
}

/// Written by the viewer application next to our cache.
#[derive(Debug, Default, Deserialize)]
struct ClientConfig {
    #[serde(rename = "customDataPath", default)]
    custom_data_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DefaultPaths {
    pub data: PathBuf,
    pub output: PathBuf,
    pub dbf: Option<PathBuf>,
    pub agent: PathBuf,
    pub cache: PathBuf,
}

impl DefaultPaths {
    pub fn compute(host: &Host) -> Result<Self> {
        let data = host
            .base_dir
            .as_deref()
            .context("could not determine the application data directory")?
            .join(APP_DIR);

        let output = match read_client_config(&data.join(CONFIG_FILE))?.custom_data_path {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => data.join(DEFAULT_OUTPUT_DIR),
        };

        Ok(DefaultPaths {
            output,
            dbf: host
                .install_location
                .as_ref()
                .map(|install| install.join(DBF_RELATIVE)),
            agent: host.os.agent_db(),
            cache: data.join(CACHE_FILE),
            data,
        })
    }
}

fn read_client_config(path: &Path) -> Result<ClientConfig> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ClientConfig::default()),
        Err(e) => return Err(e).with_context(|| format!("could not read '{}'", path.display())),
    };
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed config file '{}'", path.display()))
}

/// Cache override for `key`. Empty values count as unset.
pub fn cache_override(cache: &Cache, key: CacheKey) -> Option<PathBuf> {
    cache
        .get(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Path as a string with `/` separators.
pub fn to_slash(path: &Path) -> String {
    let path = path.to_string_lossy();
    match std::path::MAIN_SEPARATOR {
        '\\' => path.replace('\\', "/"),
        _ => path.into_owned(),
    }
}

/// Cache-aware view over the [`DefaultPaths`].
/// The cache is passed in explicitly, setters never save it.
#[derive(Debug, Clone)]
pub struct Paths {
    defaults: DefaultPaths,
}

impl Paths {
    pub fn new(defaults: DefaultPaths) -> Self {
        Paths { defaults }
    }

    pub fn defaults(&self) -> &DefaultPaths {
        &self.defaults
    }

    pub fn output(&self, cache: &Cache) -> PathBuf {
        cache_override(cache, CacheKey::OutputDir).unwrap_or_else(|| self.defaults.output.clone())
    }

    pub fn set_output(&self, cache: &mut Cache, value: &Path) {
        cache.set(CacheKey::OutputDir, to_slash(value));
    }

    pub fn dbf(&self, cache: &Cache) -> Option<PathBuf> {
        cache_override(cache, CacheKey::DbfPath).or_else(|| self.defaults.dbf.clone())
    }

    pub fn set_dbf(&self, cache: &mut Cache, value: &Path) {
        cache.set(CacheKey::DbfPath, to_slash(value));
    }

    pub fn agent(&self, cache: &Cache) -> PathBuf {
        cache_override(cache, CacheKey::AgentPath).unwrap_or_else(|| self.defaults.agent.clone())
    }

    pub fn set_agent(&self, cache: &mut Cache, value: &Path) {
        cache.set(CacheKey::AgentPath, to_slash(value));
    }

    /// Creates the data directory, the effective output directory and the
    /// directory holding the cache file.
    pub fn init_dirs(&self, cache: &Cache) -> Result<()> {
        let cache_dir = self.defaults.cache.parent();
        let output = self.output(cache);
        for dir in [Some(self.defaults.data.as_path()), Some(&output), cache_dir]
            .into_iter()
            .flatten()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}
