//! Bodega CLI - inspect a local app repository and install from it

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use bodega::catalog::{CatalogResolver, CATEGORY_DEFAULT, INDEX_FILE};
use bodega::config::Config;
use bodega::install::{
    InstallListener, InstallOrchestrator, InstallOutcome, InstallRequest, ProcessInstaller,
};
use bodega::packages::{InstalledPackages, PackageListFiles};

#[derive(Parser)]
#[command(name = "bodega", version, about = "Local app-store catalog and installer")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository root; overrides the config's repo_path
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Structurally validate the repository index
    Check,

    /// Resolve and print the catalog
    List {
        /// Category filter
        #[arg(long, default_value = CATEGORY_DEFAULT)]
        category: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Install catalog entries through the configured installer
    Install {
        /// Category filter
        #[arg(long, default_value = CATEGORY_DEFAULT)]
        category: String,

        /// Install every listed entry, not just the pre-selected ones
        #[arg(long)]
        all: bool,
    },
}

/// Listener that narrates install progress on stdout.
#[derive(Default)]
struct ProgressPrinter {
    failures: AtomicUsize,
}

impl InstallListener for ProgressPrinter {
    fn on_install_event(&self, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::Started { apk_name } => println!("installing {apk_name} ..."),
            InstallOutcome::Succeeded { apk_name } => println!("installed {apk_name}"),
            InstallOutcome::Failed { apk_name } => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                println!("FAILED {apk_name}");
            }
        }
    }
}

fn initialize_tracing(log_level: &LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.as_directive()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match (&cli.config, &cli.repo) {
        (Some(path), _) => Config::load(path)?,
        (None, Some(repo)) => Config::for_repo(repo.clone()),
        (None, None) => {
            return Err(anyhow!(
                "no repository given; pass --repo <path> or --config <file>"
            ))
        }
    };
    if let Some(repo) = &cli.repo {
        config.repo_path = repo.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    let config = load_config(&cli)?;
    let resolver = CatalogResolver::new(&config.repo_path, config.locales.clone());

    match cli.command {
        Command::Check => {
            resolver.check_repo()?;
            println!("ok: {:?}", config.repo_path.join(INDEX_FILE));
            Ok(())
        }

        Command::List { category, json } => {
            let installed =
                PackageListFiles::new(config.installed_lists.clone()).installed_packages()?;
            let entries = resolver.resolve(&category, &installed).await?;

            if json {
                let items: Vec<_> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "packageName": e.package_name(),
                            "apkName": e.apk_name(),
                            "name": e.name,
                            "summary": e.summary,
                            "description": e.description,
                            "author": e.author,
                            "categories": e.categories,
                            "icon": e.icon_path,
                            "selected": e.selected,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for entry in &entries {
                    let mark = if entry.selected { "[x]" } else { "[ ]" };
                    println!(
                        "{mark} {} ({})  {}",
                        entry.name,
                        entry.package_name(),
                        entry.summary
                    );
                }
                println!("{} entries", entries.len());
            }
            Ok(())
        }

        Command::Install { category, all } => {
            let installed =
                PackageListFiles::new(config.installed_lists.clone()).installed_packages()?;
            let entries = resolver.resolve(&category, &installed).await?;

            let batch: Vec<InstallRequest> = entries
                .iter()
                .filter(|e| all || e.selected)
                .map(InstallRequest::from)
                .collect();

            if batch.is_empty() {
                println!("nothing to install");
                return Ok(());
            }

            let installer = Arc::new(ProcessInstaller::new(config.installer.command.clone())?);
            let orchestrator = InstallOrchestrator::new(&config.repo_path, installer);

            let printer = Arc::new(ProgressPrinter::default());
            let _subscription = orchestrator.add_listener(printer.clone());

            let mut handle = orchestrator.submit(batch);
            if !handle.wait().await {
                bail!("installer stopped reporting before the batch finished");
            }

            let failures = printer.failures.load(Ordering::Relaxed);
            if failures > 0 {
                bail!("{failures} of {} installs failed", handle.total());
            }
            println!("{} installs complete", handle.total());
            Ok(())
        }
    }
}
