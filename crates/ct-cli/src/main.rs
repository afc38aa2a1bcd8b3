use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use ct_core::{BranchName, GitBranchResolver, PricingTable};
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{activity, import, report, watch};
use ct_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn open_database(config: &Config) -> Result<ct_db::Database> {
    ct_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    let resolver = GitBranchResolver::new(config.repo_dir());

    match command {
        Commands::Watch => {
            let mut db = open_database(&config)?;
            let summary = watch::run(&mut db, &config, PricingTable::default(), &resolver)?;
            println!(
                "recorded {} usage records ({} errors)",
                summary.records_written, summary.errors
            );
        }
        Commands::Import => {
            let mut db = open_database(&config)?;
            let summary = import::run(&mut db, &config, &PricingTable::default(), &resolver)?;
            println!(
                "imported {} new usage records from {} files ({} found, {} issues)",
                summary.records_written,
                summary.files_scanned,
                summary.records_found,
                summary.issues
            );
        }
        Commands::Activity { kind, branch, at } => {
            activity::run(&config.events_path, *kind, branch.as_deref(), *at, &resolver)?;
        }
        Commands::Report {
            branch,
            json,
            include_background,
        } => {
            let db = open_database(&config)?;
            let branch = branch
                .as_deref()
                .map(BranchName::new)
                .transpose()
                .context("invalid branch name")?;
            report::run(&db, &config, branch, *json, *include_background)?;
        }
    }

    Ok(())
}
