use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::cache::{Cache, CacheKey};
use crate::paths::Paths;
use crate::pipeline::Invocation;

/// Extract the DBF records of a Hearthstone client into JSON files,
/// one directory per client version.
///
/// Paths that are not given fall back to the values remembered from earlier
/// runs, then to the detected defaults.
#[derive(Debug, Parser)]
#[command(name = "auto-asset-tool", version, about, long_about = None)]
pub struct Cli {
    /// DBF asset bundle (`Data/Win/dbf.unity3d` in the install directory)
    #[arg(long, value_name = "FILE")]
    pub dbf_path: Option<PathBuf>,

    /// Directory receiving one folder per extracted version
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Battle.net agent `product.db`, used to read the client version
    #[arg(long, value_name = "FILE")]
    pub agent_path: Option<PathBuf>,

    /// Version table queried when the agent database has no version
    #[arg(long, value_name = "URL")]
    pub version_url: Option<String>,

    /// Extract even if the bundle did not change since the last run
    #[arg(short, long)]
    pub force: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Stores explicitly passed values as cache overrides, fills in the rest
    /// from the cache and defaults and checks that the inputs exist.
    pub fn resolve(&self, paths: &Paths, cache: &mut Cache) -> Result<Invocation, clap::Error> {
        if let Some(dbf_path) = &self.dbf_path {
            paths.set_dbf(cache, dbf_path);
        }
        if let Some(output) = &self.output {
            paths.set_output(cache, output);
        }
        if let Some(agent_path) = &self.agent_path {
            paths.set_agent(cache, agent_path);
        }
        if let Some(url) = &self.version_url {
            cache.set(CacheKey::VersionUrl, url.as_str());
        }

        let dbf_path = self
            .dbf_path
            .clone()
            .or_else(|| usable(paths.dbf(cache)))
            .ok_or_else(|| missing("--dbf-path"))?;
        let output = self
            .output
            .clone()
            .or_else(|| usable(Some(paths.output(cache))))
            .or_else(|| std::env::current_dir().ok())
            .ok_or_else(|| missing("--output"))?;
        let agent_path = self
            .agent_path
            .clone()
            .or_else(|| usable(Some(paths.agent(cache))))
            .ok_or_else(|| missing("--agent-path"))?;

        if !dbf_path.exists() {
            return Err(not_found("DBF path", &dbf_path));
        }
        if !agent_path.exists() {
            return Err(not_found("agent path", &agent_path));
        }

        Ok(Invocation {
            dbf_path,
            output,
            agent_path,
            force: self.force,
        })
    }
}

/// Empty, `.` and `./` do not count as a configured path.
pub fn usable(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !matches!(path.to_str(), Some("" | "." | "./")))
}

fn missing(flag: &str) -> clap::Error {
    Cli::command().error(
        ErrorKind::MissingRequiredArgument,
        format!("{flag} is required: no remembered or default value is available"),
    )
}

fn not_found(what: &str, path: &Path) -> clap::Error {
    Cli::command().error(
        ErrorKind::ValueValidation,
        format!("the {what} does not exist: {}", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "auto-asset-tool",
            "--dbf-path",
            "dbf.unity3d",
            "--output",
            "out",
            "-f",
        ])
        .unwrap();
        assert_eq!(cli.dbf_path.as_deref(), Some(Path::new("dbf.unity3d")));
        assert_eq!(cli.output.as_deref(), Some(Path::new("out")));
        assert_eq!(cli.agent_path, None);
        assert!(cli.force);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["auto-asset-tool", "-q", "-v"]).is_err());
    }

    #[test]
    fn placeholder_defaults_are_unusable() {
        assert_eq!(usable(Some(PathBuf::from("."))), None);
        assert_eq!(usable(Some(PathBuf::from("./"))), None);
        assert_eq!(usable(Some(PathBuf::new())), None);
        assert_eq!(usable(None), None);
        assert_eq!(
            usable(Some(PathBuf::from("out"))),
            Some(PathBuf::from("out"))
        );
    }
}
