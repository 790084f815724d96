pub mod product_db;
pub mod web;

use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::cache::{Cache, CacheKey};
use product_db::ProductDb;

/// Product code of the Hearthstone client in the agent database and on the patch server.
pub const PRODUCT_CODE: &str = "hsb";

/// Determines the client version an extraction is filed under.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    pub product_code: String,
    pub region: String,
    pub default_url: String,
}

impl Default for VersionResolver {
    fn default() -> Self {
        VersionResolver {
            product_code: PRODUCT_CODE.to_owned(),
            region: web::REGION.to_owned(),
            default_url: web::DEFAULT_VERSION_URL.to_owned(),
        }
    }
}

impl VersionResolver {
    /// Reads the version from the agent database, falling back to the patch
    /// server, and bumps it until it names no existing entry in `output_root`.
    pub fn resolve(&self, agent_db: &Path, output_root: &Path, cache: &mut Cache) -> Result<String> {
        let version = match self.version_from_agent(agent_db)? {
            Some(version) => version,
            None => self.version_from_web(cache)?,
        };
        let unique = unique_version(&version, output_root)?;
        tracing::info!("client version {version}, extracting as {unique}");
        Ok(unique)
    }

    pub fn version_from_agent(&self, agent_db: &Path) -> Result<Option<String>> {
        let Some(db) = ProductDb::read(agent_db)? else {
            tracing::debug!("agent database {} does not exist", agent_db.display());
            return Ok(None);
        };
        let version = db.version_of(&self.product_code).map(str::to_owned);
        if version.is_none() {
            tracing::debug!(
                "no version for '{}' in {}",
                self.product_code,
                agent_db.display()
            );
        }
        Ok(version)
    }

    /// The url comes from the cache. The default is stored there on first use.
    pub fn version_from_web(&self, cache: &mut Cache) -> Result<String> {
        let url = match cache.get(CacheKey::VersionUrl) {
            Some(url) => url.to_owned(),
            None => {
                cache.set(CacheKey::VersionUrl, self.default_url.as_str());
                self.default_url.clone()
            }
        };

        tracing::debug!("fetching version table from {url}");
        let table = web::fetch_versions_table(&url)?;
        web::parse_versions_table(&table, &self.region)
            .map(str::to_owned)
            .with_context(|| format!("no '{}' version in the table at {url}", self.region))
    }
}

/// Treats a numeric last component of `version` as a counter (or appends a
/// counter starting at 0) and increments it while `output_root/<candidate>` exists.
///
/// An unused version with a numeric last component is returned as given.
/// The counter is decimal text, so components of any length can be incremented.
pub fn unique_version(version: &str, output_root: &Path) -> Result<String> {
    ensure!(!version.is_empty(), "empty version string");

    let (prefix, last) = match version.rsplit_once('.') {
        Some((prefix, last)) => (prefix, last),
        None => ("", version),
    };
    let (prefix, mut counter, mut candidate) = match is_counter(last) {
        true => (prefix, last.trim_start_matches('0').to_owned(), version.to_owned()),
        false => (version, String::new(), format!("{version}.0")),
    };

    while output_root.join(&candidate).exists() {
        tracing::debug!("{candidate} already exists in {}", output_root.display());
        counter = incremented(&counter);
        candidate = match prefix.is_empty() {
            true => counter.clone(),
            false => format!("{prefix}.{counter}"),
        };
    }
    Ok(candidate)
}

fn is_counter(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Adds one to a string of decimal digits. The empty string counts as 0.
fn incremented(counter: &str) -> String {
    let mut digits = counter.as_bytes().to_vec();
    let mut carry = true;
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }
    digits.into_iter().map(char::from).collect()
}
