use anyhow::{Context, Result};
use auto_asset_tool::cli::Cli;
use auto_asset_tool::{
    BundleExtractor, Cache, DefaultPaths, Host, Outcome, Paths, VersionResolver, logging, pipeline,
};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let host = Host::detect();
    let paths = Paths::new(DefaultPaths::compute(&host)?);
    let mut cache = Cache::load(&paths.defaults().cache)?;

    let invocation = cli
        .resolve(&paths, &mut cache)
        .unwrap_or_else(|error| error.exit());
    std::fs::create_dir_all(&invocation.output).with_context(|| {
        format!(
            "could not create output directory '{}'",
            invocation.output.display()
        )
    })?;

    let extractor = BundleExtractor::new(!cli.quiet);
    let outcome = pipeline::run(
        &invocation,
        &paths,
        &mut cache,
        &VersionResolver::default(),
        &extractor,
    )?;

    match outcome {
        Outcome::Unchanged => println!("DBF unchanged, nothing to extract (use --force to override)"),
        Outcome::Extracted {
            version,
            output_dir,
            summary,
        } => println!(
            "Extracted {} records for version {version} into {}",
            summary.files,
            output_dir.display()
        ),
    }

    Ok(())
}
