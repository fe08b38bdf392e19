// SPDX-License-Identifier: MIT

//! Repowarden CLI: structure enforcement and component branch automation

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use repowarden::classifier;
use repowarden::component::{is_component_file, ComponentWorkflow};
use repowarden::config::AppConfig;
use repowarden::git::{GitCli, VersionControl};
use repowarden::github::{GithubClient, PullRequestClient};
use repowarden::watcher::{settle, should_process, FileWatcher, WatchEvent};
use repowarden::{RepowardenError, Result};

/// Repowarden CLI - repository structure enforcement and component branching
#[derive(Parser, Debug)]
#[command(name = "repowarden")]
#[command(version = "1.0.0")]
#[command(about = "Repository structure enforcement and automatic component branch creation", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "repowarden.json", global = true)]
    config: PathBuf,

    /// Log file for timestamped output alongside stdout
    #[arg(long, default_value = "repowarden.log", global = true)]
    log_file: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reorganize the repository root to the declared layout and commit
    Enforce {
        /// Repository to reorganize
        #[arg(short, long, default_value = ".")]
        repo: PathBuf,

        /// Show the relocation plan without moving or committing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Watch for new component files and create a branch per component
    Watch {
        /// Path to watch
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Watch subdirectories recursively
        #[arg(short, long)]
        recursive: bool,

        /// GitHub token for creating pull requests
        #[arg(short = 't', long, env = "GITHUB_TOKEN")]
        github_token: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "repowarden.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    init_tracing(filter, &cli.log_file)?;

    if !cli.quiet {
        info!("Repowarden v1.0.0");
    }

    match cli.command {
        Commands::Enforce { repo, dry_run } => {
            let config = AppConfig::load(&cli.config)?;
            run_enforce(config, &cli.config, repo, dry_run).await
        }
        Commands::Watch {
            path,
            recursive,
            github_token,
        } => {
            let config = AppConfig::load_or_default(&cli.config)?;
            run_watch(config, path, recursive, github_token).await
        }
        Commands::Config { action } => run_config_command(action, &cli.config).await,
    }
}

/// Log to stdout and to the append-mode log file
fn init_tracing(filter: &str, log_file: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    Ok(())
}

/// One-shot structure enforcement over the repository root
async fn run_enforce(
    config: AppConfig,
    config_path: &Path,
    repo: PathBuf,
    dry_run: bool,
) -> Result<()> {
    let vcs = GitCli::open(&repo)?;

    let config_file_name = config_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repowarden.json");

    let entries = classifier::list_root_entries(&repo, &config.structure, config_file_name)?;
    let placements = classifier::classify(&entries, &config.structure);

    if dry_run {
        warn!("DRY RUN MODE - nothing will be moved or committed");
        for placement in &placements {
            match placement.destination() {
                Some(folder) => println!("{} -> {}/", placement.name, folder),
                None => println!("{} (already placed)", placement.name),
            }
        }
        return Ok(());
    }

    let moved = classifier::relocate(&repo, &placements)?;

    if moved == 0 {
        info!("Root already matches the declared structure, nothing to commit");
        return Ok(());
    }

    vcs.stage_all()?;
    vcs.commit("chore: enforce defined root structure")?;
    let branch = vcs.current_branch()?;
    vcs.push(&config.watch.remote, &branch)?;

    info!(
        "Structure enforcement complete: {} entries moved, pushed {} to {}",
        moved, branch, config.watch.remote
    );
    Ok(())
}

/// Long-running component watcher loop
async fn run_watch(
    config: AppConfig,
    path: PathBuf,
    recursive: bool,
    github_token: Option<String>,
) -> Result<()> {
    if !path.exists() {
        error!("Watch path does not exist: {:?}", path);
        return Err(RepowardenError::Config(format!(
            "Watch path does not exist: {:?}",
            path
        )));
    }

    let vcs = GitCli::open(&path)?;
    info!("Initialized git repository at {:?}", path);

    let github = github_token.map(|t| GithubClient::new(&t));
    if github.is_some() {
        info!("GitHub client initialized");
    } else {
        info!("No GitHub token configured, pull requests disabled");
    }

    let workflow = ComponentWorkflow::new(
        &vcs,
        github.as_ref().map(|g| g as &dyn PullRequestClient),
        &config.watch.base_branch,
        &config.watch.remote,
    );

    let mut watcher = FileWatcher::new(recursive)?;
    watcher.watch(&path)?;
    info!("Recursive: {}", recursive);

    // Graceful shutdown on Ctrl+C / SIGTERM
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("File watcher started. Press Ctrl+C to stop.");

    // Each event is handled to completion before the next is polled; a
    // slow push or PR call stalls later events rather than overlapping
    // with them.
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        if let Some(event) = watcher.next_event(Duration::from_millis(100)) {
            match event {
                WatchEvent::Created(created) => {
                    if !created.is_file()
                        || !should_process(&created)
                        || !is_component_file(&created)
                    {
                        continue;
                    }

                    info!("New component file detected: {:?}", created);

                    // Give slow writers a second to finish
                    if !settle(&created, Duration::from_secs(10)).await {
                        debug!("File disappeared while settling: {:?}", created);
                        continue;
                    }

                    if let Err(e) = workflow.handle(&created).await {
                        error!("Failed to process {:?}: {}", created, e);
                    }
                }
                WatchEvent::Error(e) => {
                    warn!("Watch error: {}", e);
                }
            }
        }
    }

    info!("File watcher stopped.");
    Ok(())
}

/// Run config commands
async fn run_config_command(action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = AppConfig::load_or_default(config_path)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            let config = AppConfig::load(config_path)?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Rules: {} folders", config.structure.rules.len());
            println!("  Default folder: {}", config.structure.default_folder);
            println!("  Base branch: {}", config.watch.base_branch);
            println!("  Remote: {}", config.watch.remote);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_enforce_command() {
        let cli = Cli::try_parse_from(["repowarden", "enforce", "--dry-run"]).unwrap();

        match cli.command {
            Commands::Enforce { dry_run, repo } => {
                assert!(dry_run);
                assert_eq!(repo, PathBuf::from("."));
            }
            _ => panic!("Expected Enforce command"),
        }
    }

    #[test]
    fn test_cli_watch_command() {
        let cli = Cli::try_parse_from([
            "repowarden",
            "watch",
            "--path",
            "/tmp/test",
            "--recursive",
        ])
        .unwrap();

        match cli.command {
            Commands::Watch {
                path, recursive, ..
            } => {
                assert!(recursive);
                assert_eq!(path, PathBuf::from("/tmp/test"));
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["repowarden"]).is_err());
    }
}
